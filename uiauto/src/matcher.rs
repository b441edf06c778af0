use {
    crate::pattern::{Match, Pattern},
    anyhow::bail,
    image::GrayImage,
    imageproc::template_matching::{find_extremes, match_template, MatchTemplateMethod},
};

/// Finds the best occurrence of `pattern` in `haystack`.
///
/// Scoring is delegated to imageproc's normalized cross-correlation; this
/// function only applies the pattern's confidence floor and maps the result
/// back to a screen region.
pub(crate) fn locate(haystack: &GrayImage, pattern: &Pattern) -> anyhow::Result<Option<Match>> {
    let needle = pattern.image();
    if needle.width() > haystack.width() || needle.height() > haystack.height() {
        bail!(
            "pattern {:?} ({}x{}) is larger than the capture ({}x{})",
            pattern.name(),
            needle.width(),
            needle.height(),
            haystack.width(),
            haystack.height()
        );
    }
    let scores = match_template(
        haystack,
        needle,
        MatchTemplateMethod::CrossCorrelationNormalized,
    );
    let extremes = find_extremes(&scores);
    if extremes.max_value < pattern.confidence().threshold() {
        return Ok(None);
    }
    let (x, y) = extremes.max_value_location;
    Ok(Some(Match {
        x,
        y,
        width: needle.width(),
        height: needle.height(),
        score: extremes.max_value,
    }))
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::pattern::Confidence,
        image::{imageops, Luma},
    };

    // High-contrast needle: a flat region correlates poorly with it, so
    // threshold tests have a wide margin.
    fn needle() -> GrayImage {
        GrayImage::from_fn(8, 6, |x, y| {
            if (x + y) % 2 == 0 {
                Luma([250])
            } else {
                Luma([10])
            }
        })
    }

    fn haystack_with_needle_at(x: u32, y: u32) -> GrayImage {
        let mut haystack = GrayImage::from_pixel(64, 48, Luma([40]));
        imageops::replace(&mut haystack, &needle(), i64::from(x), i64::from(y));
        haystack
    }

    #[test]
    fn locates_embedded_pattern() {
        let haystack = haystack_with_needle_at(20, 10);
        let pattern = Pattern::from_image("needle", needle());

        let found = locate(&haystack, &pattern).unwrap().unwrap();
        assert_eq!((found.x, found.y), (20, 10));
        assert_eq!((found.width, found.height), (8, 6));
        assert!(found.score > 0.99);
    }

    #[test]
    fn absent_pattern_is_not_located() {
        let haystack = GrayImage::from_pixel(64, 48, Luma([40]));
        let pattern =
            Pattern::from_image("needle", needle()).with_confidence(Confidence::Similar(0.95));

        assert_eq!(locate(&haystack, &pattern).unwrap(), None);
    }

    #[test]
    fn exact_confidence_rejects_a_perturbed_match() {
        let mut haystack = haystack_with_needle_at(20, 10);
        haystack.put_pixel(20, 10, Luma([10]));

        let pattern = Pattern::from_image("needle", needle());
        assert_eq!(locate(&haystack, &pattern.exact()).unwrap(), None);
    }

    #[test]
    fn similar_confidence_accepts_a_perturbed_match() {
        let mut haystack = haystack_with_needle_at(20, 10);
        haystack.put_pixel(20, 10, Luma([10]));

        let pattern =
            Pattern::from_image("needle", needle()).with_confidence(Confidence::Similar(0.95));
        let found = locate(&haystack, &pattern).unwrap().unwrap();
        assert_eq!((found.x, found.y), (20, 10));
    }

    #[test]
    fn oversized_pattern_is_an_error() {
        let haystack = GrayImage::from_pixel(4, 4, Luma([40]));
        let pattern = Pattern::from_image("needle", needle());

        assert!(locate(&haystack, &pattern).is_err());
    }
}
