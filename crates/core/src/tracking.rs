use serde::{Deserialize, Serialize};

/// Degrees the simulated vehicle moves per tick, on both axes.
pub const DEFAULT_STEP: f64 = 0.0001;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Simulated vehicle position along a straight route.
///
/// Each tick shifts the position by `step` degrees on both axes. When a
/// destination is set the simulation stops once both axes have reached it.
#[derive(Debug, Clone)]
pub struct RouteSimulation {
    position: Coordinates,
    destination: Option<Coordinates>,
    step: f64,
}

impl RouteSimulation {
    pub fn new(start: Coordinates) -> Self {
        Self {
            position: start,
            destination: None,
            step: DEFAULT_STEP,
        }
    }

    pub fn with_destination(mut self, destination: Coordinates) -> Self {
        self.destination = Some(destination);
        self
    }

    pub fn arrived(&self) -> bool {
        match self.destination {
            Some(dest) => self.position == dest,
            None => false,
        }
    }

    /// Advances one tick and returns the new position, or `None` once
    /// the destination has been reached.
    pub fn tick(&mut self) -> Option<Coordinates> {
        if self.arrived() {
            return None;
        }
        let (lat, lon) = match self.destination {
            Some(dest) => (
                approach(self.position.latitude, dest.latitude, self.step),
                approach(self.position.longitude, dest.longitude, self.step),
            ),
            None => (
                self.position.latitude + self.step,
                self.position.longitude + self.step,
            ),
        };
        self.position = Coordinates::new(lat, lon);
        Some(self.position)
    }
}

impl Iterator for RouteSimulation {
    type Item = Coordinates;

    fn next(&mut self) -> Option<Coordinates> {
        self.tick()
    }
}

fn approach(current: f64, target: f64, step: f64) -> f64 {
    let delta = target - current;
    if delta.abs() <= step {
        target
    } else {
        current + step * delta.signum()
    }
}
