/// Eight-class diverging "Spectral" palette.
pub const SPECTRAL8: [&str; 8] = [
    "#3288bd", "#66c2a5", "#abdda4", "#e6f598", "#fee08b", "#fdae61", "#f46d43", "#d53e4f",
];

/// Color for the `index`-th series of a chart, cycling every eight entries.
pub fn series_color(index: usize) -> &'static str {
    SPECTRAL8[index % SPECTRAL8.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_cycles() {
        assert_eq!(series_color(0), "#3288bd");
        assert_eq!(series_color(8), series_color(0));
        assert_eq!(series_color(13), SPECTRAL8[5]);
    }
}
