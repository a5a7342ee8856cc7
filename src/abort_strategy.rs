use crate::memory::*;

/// Enum with possible abort strategies.
/// These strategies specify when a running iteration (with the k-means calculation) is aborted.
/// Independent of the chosen strategy, a calculation never runs more than `max_iter` iterations.
#[derive(Clone, Debug)]
pub enum AbortStrategy<T: Primitive> {
	/// This strategy aborts the calculation as soon as every centroid moved by at most `delta` (measured
	/// with the calculation's distance function) during the last iteration.
	/// ## Fields:
	/// - **delta**: Largest movement of a centroid that still counts as converged
	CentroidsConverged { delta: T },
	/// This strategy aborts the calculation directly after an iteration produced no improvement where `improvement > threshold`
	/// for the first time.
	/// ## Fields:
	/// - **threshold**: Threshold, used to detect an improvement (`improvement > threshold`)
	NoImprovement { threshold: T },
}
impl<T: Primitive> AbortStrategy<T> {
	pub(crate) fn create_logic(&self) -> Box<dyn AbortStrategyLogic<T>> {
		match *self {
			AbortStrategy::CentroidsConverged{delta} => Box::new(CentroidsConvergedLogic { delta }),
			AbortStrategy::NoImprovement{threshold} => Box::new(NoImprovementLogic {
				threshold,
				prev_error: T::infinity()
			})
		}
	}
}

/// What an iteration changed, as seen by an [`AbortStrategyLogic`].
#[derive(Clone, Copy, Debug)]
pub(crate) struct IterationProgress<'a, T: Primitive> {
	/// The new error (distsum) after the iteration
	pub error: T,
	/// Distance each centroid moved during the iteration
	pub centroid_shifts: &'a [T],
}

pub(crate) trait AbortStrategyLogic<T: Primitive> {
	/// Function that has to be called once an iteration of the calculation ended.
	/// ## Returns
	/// - **true** if the calculation should continue
	/// - **false** if the calculation should abort
	fn next(&mut self, progress: IterationProgress<'_, T>) -> bool;
}


pub(crate) struct CentroidsConvergedLogic<T: Primitive> {
	delta: T
}
impl<T: Primitive> AbortStrategyLogic<T> for CentroidsConvergedLogic<T> {
	fn next(&mut self, progress: IterationProgress<'_, T>) -> bool {
		!progress.centroid_shifts.iter().all(|&shift| shift <= self.delta)
	}
}


pub(crate) struct NoImprovementLogic<T: Primitive> {
	threshold: T,
	prev_error: T
}
impl<T: Primitive> AbortStrategyLogic<T> for NoImprovementLogic<T> {
	fn next(&mut self, progress: IterationProgress<'_, T>) -> bool {
		let improvement = self.prev_error - progress.error;
		self.prev_error = progress.error;
		improvement > self.threshold
	}
}


#[cfg(test)]
mod tests {
	use super::*;

	fn progress<T: Primitive>(error: f64, shifts: &[T]) -> IterationProgress<'_, T> {
		IterationProgress { error: T::from(error).unwrap(), centroid_shifts: shifts }
	}

	#[test] fn test_centroids_converged_f32() { test_centroids_converged::<f32>(); }
	#[test] fn test_centroids_converged_f64() { test_centroids_converged::<f64>(); }

	fn test_centroids_converged<T: Primitive>() {
		let delta = T::from(0.001).unwrap();
		let mut abort_strategy = AbortStrategy::CentroidsConverged { delta }.create_logic();
		let moving = [T::from(2.5).unwrap(), T::from(0.0).unwrap()];
		let almost = [T::from(0.0005).unwrap(), T::from(0.0011).unwrap()];
		let settled = [T::from(0.0005).unwrap(), T::from(0.001).unwrap()];
		assert_eq!(abort_strategy.next(progress(10.0, &moving)), true);
		assert_eq!(abort_strategy.next(progress(9.0, &almost)), true);
		assert_eq!(abort_strategy.next(progress(9.0, &settled)), false);
		// error does not matter for this strategy
		assert_eq!(abort_strategy.next(progress(99.0, &moving)), true);
	}

	#[test] fn test_no_improvement_f32() { test_no_improvement::<f32>(); }
	#[test] fn test_no_improvement_f64() { test_no_improvement::<f64>(); }

	fn test_no_improvement<T: Primitive>() {
		let no_shifts: [T; 0] = [];
		{
			let mut abort_strategy = AbortStrategy::NoImprovement { threshold: T::from(0.0005).unwrap() }.create_logic();
			assert_eq!(abort_strategy.next(progress(3000.0, &no_shifts)), true);
			assert_eq!(abort_strategy.next(progress(3000.0, &no_shifts)), false);
		}
		{
			let mut abort_strategy = AbortStrategy::NoImprovement { threshold: T::from(0.0005).unwrap() }.create_logic();
			assert_eq!(abort_strategy.next(progress(3000.0, &no_shifts)), true);
			assert_eq!(abort_strategy.next(progress(2000.0, &no_shifts)), true);
			assert_eq!(abort_strategy.next(progress(1999.99, &no_shifts)), true);
			assert_eq!(abort_strategy.next(progress(1999.99, &no_shifts)), false);
		}
	}
}
