// marquee.rs - 旁白文字跑马灯的水平位置

/// Scroll speed in logical pixels per second.
pub const MARQUEE_SPEED: f32 = 30.0;

/// Left edge of the scrolling label `elapsed` seconds after the page opened.
///
/// The label enters from the right edge of the view, moves left at
/// [`MARQUEE_SPEED`] and wraps around once it has fully left the view.
pub fn marquee_offset(elapsed: f32, label_width: f32, view_width: f32) -> f32 {
    let travel = label_width.max(0.0) + view_width.max(0.0);
    if travel <= 0.0 || !elapsed.is_finite() {
        return view_width;
    }
    let distance = (elapsed.max(0.0) * MARQUEE_SPEED).rem_euclid(travel);
    view_width - distance
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn starts_at_right_edge() {
        assert_eq!(marquee_offset(0.0, 200.0, 800.0), 800.0);
    }

    #[test]
    fn moves_left_at_constant_speed() {
        assert_relative_eq!(marquee_offset(2.0, 200.0, 800.0), 740.0);
    }

    #[test]
    fn wraps_after_leaving_the_view() {
        // 1000 px of travel takes 33.3 s
        let just_before = marquee_offset(33.3, 200.0, 800.0);
        assert!(just_before < -190.0);
        assert_relative_eq!(
            marquee_offset(1000.0 / 30.0 + 1.0, 200.0, 800.0),
            770.0,
            epsilon = 1e-2
        );
    }

    #[test]
    fn degenerate_sizes_stay_put() {
        assert_eq!(marquee_offset(5.0, 0.0, 0.0), 0.0);
    }
}
