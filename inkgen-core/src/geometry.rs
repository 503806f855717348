use serde::{Deserialize, Serialize};

/// One sample of the pen trajectory.
///
/// Straight out of the engine `x`/`y` are displacements relative to the
/// previous point; after [`accumulate`] they are absolute positions.
/// `pen_lift` marks the end of a stroke: the pen leaves the paper after
/// this point.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Point {
	pub x: f32,
	pub y: f32,
	pub pen_lift: bool,
}

impl Point {
	pub fn new(x: f32, y: f32, pen_lift: bool) -> Self {
		Self { x, y, pen_lift }
	}

	/// The start token fed to the model before the first step.
	pub fn origin() -> Self {
		Self::new(0.0, 0.0, true)
	}
}

/// A continuous pen-down motion: the absolute points between two pen lifts.
///
/// # Invariants
/// - Never empty
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Stroke {
	points: Vec<[f32; 2]>,
}

impl Stroke {
	pub fn points(&self) -> &[[f32; 2]] {
		&self.points
	}

	pub fn len(&self) -> usize {
		self.points.len()
	}

	/// Always false, kept for API symmetry with `len`.
	pub fn is_empty(&self) -> bool {
		self.points.is_empty()
	}
}

/// Axis-aligned extent of a point set.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
	pub min_x: f32,
	pub max_x: f32,
	pub min_y: f32,
	pub max_y: f32,
}

impl Bounds {
	pub fn width(&self) -> f32 {
		self.max_x - self.min_x
	}

	pub fn height(&self) -> f32 {
		self.max_y - self.min_y
	}
}

/// Turns relative displacements into absolute positions.
///
/// Left-to-right running sum over `(x, y)`; the pen-lift bit is passed
/// through unchanged. The first point is its own offset from the origin.
pub fn accumulate(points: &[Point]) -> Vec<Point> {
	let mut x = 0.0f32;
	let mut y = 0.0f32;
	points
		.iter()
		.map(|point| {
			x += point.x;
			y += point.y;
			Point::new(x, y, point.pen_lift)
		})
		.collect()
}

/// Partitions absolute points into strokes at pen-lift boundaries.
///
/// A lifted point is the last member of the stroke it closes. A trailing
/// run of points that never reaches a lift is still emitted as a stroke,
/// so concatenating the strokes always gives back the input coordinates.
pub fn split_strokes(points: &[Point]) -> Vec<Stroke> {
	let mut strokes = Vec::new();
	let mut current: Vec<[f32; 2]> = Vec::new();

	for point in points {
		current.push([point.x, point.y]);
		if point.pen_lift {
			strokes.push(Stroke { points: std::mem::take(&mut current) });
		}
	}

	if !current.is_empty() {
		strokes.push(Stroke { points: current });
	}

	strokes
}

/// Returns the extent of `points`, or `None` for an empty slice.
pub fn bounds(points: &[Point]) -> Option<Bounds> {
	let first = points.first()?;
	let init = Bounds { min_x: first.x, max_x: first.x, min_y: first.y, max_y: first.y };
	Some(points.iter().skip(1).fold(init, |b, p| Bounds {
		min_x: b.min_x.min(p.x),
		max_x: b.max_x.max(p.x),
		min_y: b.min_y.min(p.y),
		max_y: b.max_y.max(p.y),
	}))
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	fn arb_point() -> impl Strategy<Value = Point> {
		(-50.0f32..50.0, -50.0f32..50.0, any::<bool>()).prop_map(|(x, y, lift)| Point::new(x, y, lift))
	}

	#[test]
	fn accumulate_sums_displacements() {
		let points = vec![
			Point::new(1.0, 2.0, false),
			Point::new(0.5, -1.0, true),
			Point::new(-2.0, 0.0, false),
		];
		let absolute = accumulate(&points);
		assert_eq!(absolute[0], Point::new(1.0, 2.0, false));
		assert_eq!(absolute[1], Point::new(1.5, 1.0, true));
		assert_eq!(absolute[2], Point::new(-0.5, 1.0, false));
	}

	#[test]
	fn accumulate_empty() {
		assert!(accumulate(&[]).is_empty());
	}

	#[test]
	fn split_closes_stroke_on_lift() {
		let points = vec![
			Point::new(0.0, 0.0, true),
			Point::new(1.0, 0.0, false),
			Point::new(2.0, 0.0, true),
			Point::new(3.0, 1.0, true),
		];
		let strokes = split_strokes(&points);
		assert_eq!(strokes.len(), 3);
		assert_eq!(strokes[0].points(), &[[0.0, 0.0]]);
		assert_eq!(strokes[1].points(), &[[1.0, 0.0], [2.0, 0.0]]);
		assert_eq!(strokes[2].points(), &[[3.0, 1.0]]);
	}

	#[test]
	fn split_emits_trailing_partial_stroke() {
		let points = vec![
			Point::new(0.0, 0.0, true),
			Point::new(1.0, 1.0, false),
			Point::new(2.0, 2.0, false),
		];
		let strokes = split_strokes(&points);
		assert_eq!(strokes.len(), 2);
		assert_eq!(strokes[1].points(), &[[1.0, 1.0], [2.0, 2.0]]);
	}

	#[test]
	fn split_empty_input_has_no_strokes() {
		assert!(split_strokes(&[]).is_empty());
	}

	#[test]
	fn bounds_of_points() {
		let points = vec![
			Point::new(1.0, -2.0, false),
			Point::new(-3.0, 4.0, false),
			Point::new(2.0, 0.5, true),
		];
		let b = bounds(&points).unwrap();
		assert_eq!(b, Bounds { min_x: -3.0, max_x: 2.0, min_y: -2.0, max_y: 4.0 });
		assert_eq!(b.width(), 5.0);
		assert_eq!(b.height(), 6.0);
		assert!(bounds(&[]).is_none());
	}

	proptest! {
		#[test]
		fn accumulate_is_running_sum(points in prop::collection::vec(arb_point(), 0..64)) {
			let absolute = accumulate(&points);
			prop_assert_eq!(absolute.len(), points.len());
			let (mut x, mut y) = (0.0f32, 0.0f32);
			for (i, point) in points.iter().enumerate() {
				x += point.x;
				y += point.y;
				prop_assert_eq!(absolute[i].x, x);
				prop_assert_eq!(absolute[i].y, y);
				prop_assert_eq!(absolute[i].pen_lift, point.pen_lift);
			}
		}

		#[test]
		fn split_partitions_exactly(points in prop::collection::vec(arb_point(), 0..64)) {
			let strokes = split_strokes(&points);

			let rejoined: Vec<[f32; 2]> = strokes.iter().flat_map(|s| s.points().iter().copied()).collect();
			let original: Vec<[f32; 2]> = points.iter().map(|p| [p.x, p.y]).collect();
			prop_assert_eq!(rejoined, original);

			let mut offset = 0;
			for (i, stroke) in strokes.iter().enumerate() {
				prop_assert!(!stroke.is_empty());
				offset += stroke.len();
				let closing = points[offset - 1];
				if i + 1 < strokes.len() {
					prop_assert!(closing.pen_lift);
				}
				// No lift may hide inside a stroke.
				let inner = &points[offset - stroke.len()..offset - 1];
				prop_assert!(inner.iter().all(|p| !p.pen_lift));
			}
		}
	}
}
