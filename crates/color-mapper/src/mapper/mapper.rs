//! ColorMapper struct with ordered entries and nearest-color matching.
//!
//! A `ColorMapper` binds each reference color of a small LED palette to an
//! arbitrary value (usually the numeric code the controller expects) and
//! answers "which palette entry is closest to this color" queries.

use std::collections::HashMap;
use std::str::FromStr;

use super::error::MapperError;
use crate::color::Color;

/// One reference color and the value bound to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorEntry<V> {
    pub color: Color,
    pub value: V,
}

/// An immutable, ordered set of reference colors with bound values.
///
/// Entries keep the order they were supplied in. That order decides ties:
/// when several entries are equally close to a query, the earliest one
/// wins. A mapper always holds at least one entry, so every query has an
/// answer.
///
/// The value type `V` is opaque to the mapper; it is stored and handed back
/// unchanged.
///
/// # Example
///
/// ```
/// use color_mapper::{Color, ColorMapper};
///
/// let mapper = ColorMapper::new([
///     ("#FF0000", 1),
///     ("#00FF00", 2),
///     ("#0000FF", 3),
/// ])
/// .unwrap();
///
/// assert_eq!(mapper.nearest_color(0xEE1111u32), Color::new(0xFF, 0, 0));
/// assert_eq!(*mapper.value_for_nearest_color(0x1111EEu32), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorMapper<V> {
    entries: Vec<ColorEntry<V>>,
}

impl<V> ColorMapper<V> {
    /// Build a mapper from `#RRGGBB` keys and their values.
    ///
    /// Entries are kept in iteration order. If two keys decode to the same
    /// color (e.g. `#ff0000` and `#FF0000`), the later value replaces the
    /// earlier one, which keeps its position.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `mapping` is empty ([`MapperError::EmptyMapping`])
    /// - any key is not exactly `#` plus six hex digits
    ///   ([`MapperError::InvalidColorKey`]), reported for the first such key
    ///
    /// # Example
    ///
    /// ```
    /// use color_mapper::{ColorMapper, MapperError};
    ///
    /// let err = ColorMapper::new([("#FF0000", 1), ("not a color", 2)]).unwrap_err();
    /// assert!(matches!(err, MapperError::InvalidColorKey { .. }));
    ///
    /// let err = ColorMapper::<i32>::new(Vec::<(&str, i32)>::new()).unwrap_err();
    /// assert_eq!(err, MapperError::EmptyMapping);
    /// ```
    pub fn new<I, K>(mapping: I) -> Result<Self, MapperError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
    {
        let colors = mapping
            .into_iter()
            .map(|(key, value)| {
                let key = key.as_ref();
                Color::from_str(key)
                    .map(|color| (color, value))
                    .map_err(|reason| MapperError::InvalidColorKey {
                        key: key.to_string(),
                        reason,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_colors(colors)
    }

    /// Build a mapper from already-parsed colors.
    ///
    /// Same ordering and duplicate rules as [`ColorMapper::new`].
    ///
    /// # Errors
    ///
    /// Returns [`MapperError::EmptyMapping`] if `mapping` is empty.
    pub fn from_colors<I>(mapping: I) -> Result<Self, MapperError>
    where
        I: IntoIterator<Item = (Color, V)>,
    {
        let mut entries: Vec<ColorEntry<V>> = Vec::new();
        let mut positions: HashMap<Color, usize> = HashMap::new();

        for (color, value) in mapping {
            match positions.get(&color) {
                Some(&idx) => entries[idx].value = value,
                None => {
                    positions.insert(color, entries.len());
                    entries.push(ColorEntry { color, value });
                }
            }
        }

        if entries.is_empty() {
            return Err(MapperError::EmptyMapping);
        }

        Ok(Self { entries })
    }

    /// Returns the number of reference entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`: empty mappings are rejected at construction.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, in insertion order.
    #[inline]
    pub fn entries(&self) -> &[ColorEntry<V>] {
        &self.entries
    }

    #[inline]
    pub fn get(&self, idx: usize) -> Option<&ColorEntry<V>> {
        self.entries.get(idx)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ColorEntry<V>> {
        self.entries.iter()
    }

    /// Find the entry closest to `query`.
    ///
    /// Returns `(index, squared distance)`. The scan only moves to a later
    /// entry on a strictly smaller distance, so ties go to the entry that
    /// was inserted first.
    #[inline]
    pub fn find_nearest(&self, query: impl Into<Color>) -> (usize, u32) {
        let query = query.into();

        // Linear scan; palettes are a handful of LEDs
        let mut best_idx = 0;
        let mut best_dist = u32::MAX;

        for (i, entry) in self.entries.iter().enumerate() {
            let dist = entry.color.distance_squared(query);
            if dist < best_dist {
                best_dist = dist;
                best_idx = i;
            }
        }

        (best_idx, best_dist)
    }

    /// The entry closest to `query`.
    #[inline]
    pub fn nearest_entry(&self, query: impl Into<Color>) -> &ColorEntry<V> {
        let (idx, _) = self.find_nearest(query);
        &self.entries[idx]
    }

    /// The reference color closest to `query`.
    #[inline]
    pub fn nearest_color(&self, query: impl Into<Color>) -> Color {
        self.nearest_entry(query).color
    }

    /// The value bound to the reference color closest to `query`.
    ///
    /// Always the value of the entry [`nearest_color`](Self::nearest_color)
    /// selects for the same query.
    #[inline]
    pub fn value_for_nearest_color(&self, query: impl Into<Color>) -> &V {
        &self.nearest_entry(query).value
    }
}

impl<'a, V> IntoIterator for &'a ColorMapper<V> {
    type Item = &'a ColorEntry<V>;
    type IntoIter = std::slice::Iter<'a, ColorEntry<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::ParseColorError;

    fn rgb_mapper() -> ColorMapper<u8> {
        ColorMapper::new([("#FF0000", 1), ("#00FF00", 2), ("#0000FF", 3)]).unwrap()
    }

    // Construction tests
    #[test]
    fn test_mapper_basic_construction() {
        let mapper = rgb_mapper();
        assert_eq!(mapper.len(), 3);
        assert!(!mapper.is_empty());
    }

    #[test]
    fn test_mapper_preserves_insertion_order() {
        let mapper = ColorMapper::new([("#0000FF", 'b'), ("#FF0000", 'r'), ("#00FF00", 'g')])
            .unwrap();
        let values: Vec<char> = mapper.iter().map(|e| e.value).collect();
        assert_eq!(values, ['b', 'r', 'g']);
        assert_eq!(mapper.get(1).unwrap().color, Color::new(255, 0, 0));
        assert!(mapper.get(3).is_none());
    }

    #[test]
    fn test_mapper_empty_error() {
        let result = ColorMapper::<u8>::new(Vec::<(String, u8)>::new());
        assert_eq!(result, Err(MapperError::EmptyMapping));

        let result = ColorMapper::<u8>::from_colors([]);
        assert_eq!(result, Err(MapperError::EmptyMapping));
    }

    #[test]
    fn test_mapper_invalid_key_error() {
        let result = ColorMapper::new([("not a color", 1)]);
        assert_eq!(
            result,
            Err(MapperError::InvalidColorKey {
                key: "not a color".to_string(),
                reason: ParseColorError::MissingHash,
            })
        );
    }

    #[test]
    fn test_mapper_invalid_key_among_valid_ones() {
        let result = ColorMapper::new([("#FF0000", 1), ("#00FF00", 2), ("#00FF0", 3)]);
        assert!(matches!(
            result,
            Err(MapperError::InvalidColorKey { ref key, .. }) if key == "#00FF0"
        ));
    }

    #[test]
    fn test_mapper_reports_first_invalid_key() {
        let result = ColorMapper::new([("#FF0000", 1), ("#XYZXYZ", 2), ("oops", 3)]);
        match result {
            Err(MapperError::InvalidColorKey { key, reason }) => {
                assert_eq!(key, "#XYZXYZ");
                assert_eq!(reason, ParseColorError::InvalidHex);
            }
            other => panic!("expected InvalidColorKey, got {:?}", other),
        }
    }

    #[test]
    fn test_mapper_accepts_owned_keys() {
        let keys = vec![("#123456".to_string(), "a"), ("#abcdef".to_string(), "b")];
        let mapper = ColorMapper::new(keys).unwrap();
        assert_eq!(mapper.entries()[1].color, Color::new(0xAB, 0xCD, 0xEF));
    }

    #[test]
    fn test_duplicate_key_last_value_wins_first_position() {
        let mapper =
            ColorMapper::new([("#FF0000", 1), ("#00FF00", 2), ("#ff0000", 3)]).unwrap();
        assert_eq!(mapper.len(), 2);
        assert_eq!(mapper.entries()[0].color, Color::new(255, 0, 0));
        assert_eq!(mapper.entries()[0].value, 3);
        assert_eq!(*mapper.value_for_nearest_color(0xFF0000u32), 3);
    }

    #[test]
    fn test_single_entry_always_wins() {
        let mapper = ColorMapper::new([("#808080", "only")]).unwrap();
        for query in [0x000000u32, 0xFFFFFF, 0x808080, 0x123456] {
            assert_eq!(*mapper.value_for_nearest_color(query), "only");
        }
    }

    // find_nearest tests
    #[test]
    fn test_find_nearest_exact_match() {
        let mapper = rgb_mapper();
        let (idx, dist) = mapper.find_nearest(Color::new(0, 255, 0));
        assert_eq!(idx, 1);
        assert_eq!(dist, 0);
    }

    #[test]
    fn test_find_nearest_reports_distance() {
        let mapper = rgb_mapper();
        let (idx, dist) = mapper.find_nearest(Color::new(250, 3, 4));
        assert_eq!(idx, 0);
        assert_eq!(dist, 25 + 9 + 16);
    }

    #[test]
    fn test_tie_goes_to_first_inserted() {
        // Grey 0x7F7F7F is equidistant from pure red, green and blue
        let query = Color::new(0x7F, 0x7F, 0x7F);
        let forward = rgb_mapper();
        assert_eq!(*forward.value_for_nearest_color(query), 1);

        let reversed =
            ColorMapper::new([("#0000FF", 3), ("#00FF00", 2), ("#FF0000", 1)]).unwrap();
        assert_eq!(*reversed.value_for_nearest_color(query), 3);
    }

    #[test]
    fn test_tie_ignores_surrounding_entries() {
        // 0x000000 and 0x0000FE are both 127² away from 0x00007F
        let mapper = ColorMapper::new([
            ("#FF0000", "far-red"),
            ("#000000", "black"),
            ("#00FF00", "far-green"),
            ("#0000FE", "blue"),
            ("#FFFFFF", "far-white"),
        ])
        .unwrap();
        assert_eq!(*mapper.value_for_nearest_color(0x00007Fu32), "black");
        assert_eq!(mapper.nearest_color(0x00007Fu32), Color::new(0, 0, 0));
    }

    #[test]
    fn test_color_and_value_queries_agree() {
        let mapper = rgb_mapper();
        for query in (0..=0xFFFFFFu32).step_by(0x0F0F0F) {
            let color = mapper.nearest_color(query);
            let value = *mapper.value_for_nearest_color(query);
            let entry = mapper.nearest_entry(query);
            assert_eq!(entry.color, color);
            assert_eq!(entry.value, value);
        }
    }

    #[test]
    fn test_from_colors_typed() {
        let mapper = ColorMapper::from_colors([
            (Color::new(0, 0, 0), "off"),
            (Color::new(255, 255, 255), "on"),
        ])
        .unwrap();
        assert_eq!(*mapper.value_for_nearest_color(Color::new(40, 40, 40)), "off");
        assert_eq!(*mapper.value_for_nearest_color(Color::new(200, 200, 200)), "on");
    }

    #[test]
    fn test_ref_into_iterator() {
        let mapper = rgb_mapper();
        let sum: u32 = (&mapper).into_iter().map(|e| u32::from(e.value)).sum();
        assert_eq!(sum, 6);
        let mut count = 0;
        for _ in &mapper {
            count += 1;
        }
        assert_eq!(count, 3);
    }
}
