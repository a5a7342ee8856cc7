/// Converts a literal into the primitive of the current calculation. All literals used with this are
/// exactly representable in `f32` and `f64`.
#[inline(always)]
pub(crate) fn lit<T: crate::Primitive>(val: f64) -> T {
    T::from(val).unwrap_or_else(T::nan)
}

#[cfg(test)]
macro_rules! assert_approx_eq {
	($left: expr, $right: expr, $tol: expr) => ({
		match ($left, $right, $tol) {
			(left_val , right_val, tol_val) => {
				let delta = (left_val - right_val).abs();
				if !(delta < tol_val) {
					panic!(
						"assertion failed: `(left ≈ right)` \
						(left: `{}`, right: `{}`) \
						with ∆={:1.1e} (allowed ∆={:e})",
						left_val , right_val, delta, tol_val
					)
				}
			}
		}
	});
	($left: expr, $right: expr) => (assert_approx_eq!(($left), ($right), 1e-15))
}

#[cfg(test)]
pub(crate) mod testing {
	use std::collections::HashMap;

	/// Compares two cluster assignments, ignoring which integer label each group got.
	/// Panics with both assignments, if the grouping differs.
	pub fn assert_same_grouping(should: &[usize], actual: &[usize]) {
		assert_eq!(should.len(), actual.len());
		let mut idmap = HashMap::new();
		let mut idrevmap = HashMap::new();
		for idx in 0..should.len() {
			let (should_id, actual_id) = (should[idx], actual[idx]);
			let mapped = *idmap.entry(should_id).or_insert(actual_id);
			let rev_mapped = *idrevmap.entry(actual_id).or_insert(should_id);
			if mapped != actual_id || rev_mapped != should_id {
				panic!(
					"Cluster assignments different at idx {}.\nMapping(should -> actual): {:?}\nActual: {:?}\nShould: {:?}",
					idx, idmap, actual, should
				);
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::testing::assert_same_grouping;

	#[test]
	fn grouping_ignores_labels() {
		assert_same_grouping(&[0, 0, 1, 1], &[1, 1, 0, 0]);
		assert_same_grouping(&[2, 0, 2], &[0, 1, 0]);
	}

	#[test]
	#[should_panic]
	fn grouping_detects_split_groups() {
		assert_same_grouping(&[0, 0, 1, 1], &[0, 1, 1, 1]);
	}

	#[test]
	#[should_panic]
	fn grouping_detects_merged_groups() {
		assert_same_grouping(&[0, 0, 1, 1], &[0, 0, 0, 0]);
	}

	#[test]
	fn literal_conversion() {
		assert_eq!(super::lit::<f32>(0.5), 0.5f32);
		assert_eq!(super::lit::<f64>(0.001), 0.001f64);
	}
}
