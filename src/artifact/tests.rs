// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::collections::HashSet;

use strum::IntoEnumIterator;

use super::*;

#[test]
fn test_index_width() {
    assert_eq!(index_width(0), None);
    // A single channel still gets a digit.
    assert_eq!(index_width(1), Some(1));
    assert_eq!(index_width(2), Some(1));
    assert_eq!(index_width(9), Some(1));
    assert_eq!(index_width(10), Some(1));
    assert_eq!(index_width(11), Some(2));
    assert_eq!(index_width(100), Some(2));
    assert_eq!(index_width(101), Some(3));
    assert_eq!(index_width(1000), Some(3));
    assert_eq!(index_width(1001), Some(4));
}

#[test]
fn test_index_width_matches_log10() {
    for count in 2..5000_usize {
        let expected = (count as f64).log10().ceil() as usize;
        assert_eq!(index_width(count), Some(expected.max(1)), "count {count}");
    }
}

#[test]
fn test_zero_padded_round_trips_to_index() {
    for count in [1, 7, 10, 11, 64, 100, 257] {
        let width = index_width(count).unwrap();
        for i in 0..count {
            let s = zero_padded(i, count).unwrap();
            assert_eq!(s.len(), width);
            assert_eq!(s.parse::<usize>().unwrap(), i);
        }
        assert!(zero_padded(count, count).is_none());
    }
    assert!(zero_padded(0, 0).is_none());
}

#[test]
fn test_identifiers_are_injective_and_sort_numerically() {
    let count = 123;
    let names = (0..count)
        .map(|i| {
            ArtifactId::new(Category::LightCurve1D, i, count)
                .unwrap()
                .file_name()
        })
        .collect::<Vec<_>>();
    let unique = names.iter().collect::<HashSet<_>>();
    assert_eq!(unique.len(), count);

    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(sorted, names);
}

#[test]
fn test_file_names() {
    let id = ArtifactId::new(Category::LightCurve1D, 7, 120).unwrap();
    assert_eq!(id.file_name(), "Fig43007-1D_LC.png");
    assert_eq!(id.to_string(), "Fig43007");

    let id = ArtifactId::new(Category::Drift, 0, 1).unwrap();
    assert_eq!(id.file_name(), "Fig410-Drift.png");

    let id = ArtifactId::new(Category::LightCurve2D, 0, 20).unwrap();
    assert_eq!(id.file_name(), "Fig4200-2D_LC.png");

    let id = ArtifactId::new(Category::CcSpectrum, 3, 5).unwrap();
    assert_eq!(id.file_name(), "Fig443-CC_Spec.png");

    let id = ArtifactId::new(Category::CcValues, 12, 13).unwrap();
    assert_eq!(id.file_name(), "Fig4512-CC_Vals.png");
}

#[test]
fn test_path() {
    let id = ArtifactId::new(Category::LightCurve1D, 2, 4).unwrap();
    assert_eq!(
        id.path(Path::new("/tmp/out")),
        PathBuf::from("/tmp/out/figs/Fig432-1D_LC.png")
    );
}

#[test]
fn test_figure_handle_is_shared_within_a_category() {
    let handles = (0..150)
        .map(|i| {
            ArtifactId::new(Category::CcValues, i, 150)
                .unwrap()
                .figure_handle()
                .unwrap()
        })
        .collect::<HashSet<_>>();
    assert_eq!(handles.len(), 1);
    assert!(handles.contains(&FigureHandle(45000)));

    let h = ArtifactId::new(Category::Drift, 0, 1)
        .unwrap()
        .figure_handle()
        .unwrap();
    assert_eq!(h, FigureHandle(410));
    assert_eq!(h.to_string(), "410");
}

#[test]
fn test_figure_handles_differ_between_categories() {
    let handles = Category::iter()
        .map(|c| ArtifactId::new(c, 0, 30).unwrap().figure_handle().unwrap())
        .collect::<HashSet<_>>();
    assert_eq!(handles.len(), 5);
}

#[test]
fn test_figure_handle_overflow() {
    let id = ArtifactId::new(Category::CcValues, 0, usize::MAX).unwrap();
    assert!(matches!(
        id.figure_handle(),
        Err(ArtifactError::HandleOverflow { code: 45, .. })
    ));
}

#[test]
fn test_invalid_index_ranges() {
    assert!(matches!(
        ArtifactId::new(Category::LightCurve1D, 0, 0),
        Err(ArtifactError::ZeroCount { .. })
    ));
    assert!(matches!(
        ArtifactId::new(Category::LightCurve1D, 4, 4),
        Err(ArtifactError::IndexOutOfRange {
            index: 4,
            count: 4,
            ..
        })
    ));
}
