//! Translation of signed coordinate tuples into hyperslab selections.
//!
//! Every coordinate is checked against the dataset extent here, before a
//! selection ever reaches the engine.

use h5grid_format::Hyperslab;

use crate::error::{Error, Result};

/// Convert `coords` into unsigned offsets, checking each against `dims`.
pub fn to_offsets(name: &str, coords: &[i64], dims: &[u64]) -> Result<Vec<u64>> {
    if coords.len() != dims.len() {
        return Err(Error::RankMismatch {
            name: name.to_string(),
            expected: dims.len(),
            actual: coords.len(),
        });
    }
    coords
        .iter()
        .zip(dims)
        .map(|(&c, &d)| u64::try_from(c).ok().filter(|&c| c < d))
        .collect::<Option<Vec<u64>>>()
        .ok_or_else(|| Error::IndexOutOfRange {
            name: name.to_string(),
            coordinate: coords.to_vec(),
            extents: dims.to_vec(),
        })
}

/// Single-element selection at `coords`.
pub fn point(name: &str, coords: &[i64], dims: &[u64]) -> Result<Hyperslab> {
    Ok(Hyperslab::point(&to_offsets(name, coords, dims)?))
}

/// The `D0 x D1` plane of a 4-D dataset at third/fourth coordinates `(i, j)`.
pub fn slice_2d(name: &str, i: i64, j: i64, dims: &[u64]) -> Result<Hyperslab> {
    if dims.len() != 4 {
        return Err(Error::RankMismatch {
            name: name.to_string(),
            expected: 4,
            actual: dims.len(),
        });
    }
    let out_of_range = || Error::IndexOutOfRange {
        name: name.to_string(),
        coordinate: vec![i, j],
        extents: dims[2..].to_vec(),
    };
    let i = u64::try_from(i).ok().filter(|&i| i < dims[2]).ok_or_else(out_of_range)?;
    let j = u64::try_from(j).ok().filter(|&j| j < dims[3]).ok_or_else(out_of_range)?;
    Ok(Hyperslab::new(vec![0, 0, i, j], vec![dims[0], dims[1], 1, 1]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_range_coordinates_convert() {
        assert_eq!(to_offsets("m", &[0, 1, 2, 3], &[1, 2, 3, 4]).unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn negative_coordinate_is_out_of_range() {
        let err = to_offsets("m", &[0, -1], &[2, 2]).unwrap_err();
        match err {
            Error::IndexOutOfRange {
                name,
                coordinate,
                extents,
            } => {
                assert_eq!(name, "m");
                assert_eq!(coordinate, vec![0, -1]);
                assert_eq!(extents, vec![2, 2]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn coordinate_equal_to_extent_is_out_of_range() {
        assert!(matches!(
            to_offsets("v", &[5], &[5]),
            Err(Error::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn zero_extent_rejects_everything() {
        assert!(matches!(
            to_offsets("v", &[0], &[0]),
            Err(Error::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn wrong_rank_is_rank_mismatch() {
        assert!(matches!(
            to_offsets("m", &[0, 0, 0], &[1, 1, 1, 1]),
            Err(Error::RankMismatch {
                expected: 4,
                actual: 3,
                ..
            })
        ));
    }

    #[test]
    fn point_selects_one_element() {
        let sel = point("m", &[1, 0, 2], &[2, 2, 3]).unwrap();
        assert_eq!(sel.start, vec![1, 0, 2]);
        assert_eq!(sel.num_elements(), 1);
    }

    #[test]
    fn slice_2d_selects_leading_plane() {
        let sel = slice_2d("m", 1, 2, &[3, 4, 5, 6]).unwrap();
        assert_eq!(sel.start, vec![0, 0, 1, 2]);
        assert_eq!(sel.count, vec![3, 4, 1, 1]);
    }

    #[test]
    fn slice_2d_checks_only_trailing_axes() {
        assert!(slice_2d("m", 4, 5, &[1, 1, 5, 6]).is_ok());
        assert!(matches!(
            slice_2d("m", 5, 0, &[1, 1, 5, 6]),
            Err(Error::IndexOutOfRange { .. })
        ));
        assert!(matches!(
            slice_2d("m", 0, -1, &[1, 1, 5, 6]),
            Err(Error::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn slice_2d_needs_rank_four() {
        assert!(matches!(
            slice_2d("m", 0, 0, &[2, 2, 2]),
            Err(Error::RankMismatch { .. })
        ));
    }
}
