//! Degree-to-radius scale for node circles.

/// Saturating linear scale: `base + min(degree * step, cap)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RadiusScale {
	pub base: f64,
	pub step: f64,
	pub cap: f64,
}

impl Default for RadiusScale {
	fn default() -> Self {
		Self {
			base: 8.0,
			step: 3.0,
			cap: 20.0,
		}
	}
}

impl RadiusScale {
	pub fn radius(&self, degree: usize) -> f64 {
		self.base + (degree as f64 * self.step).min(self.cap)
	}
}
