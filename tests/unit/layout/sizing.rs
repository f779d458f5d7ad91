use super::*;

#[test]
fn row_table_literals() {
    assert_eq!(stats_block_width(LayoutKind::Row, 320.0, 4), 320.0);
    assert_eq!(stats_block_width(LayoutKind::Row, 320.0, 3), 296.0);
    assert_eq!(stats_block_width(LayoutKind::Row, 200.0, 3), 220.0);
    assert_eq!(stats_block_width(LayoutKind::Row, 320.0, 2), 242.0);
    assert_eq!(stats_block_width(LayoutKind::Row, 200.0, 2), 170.0);
    assert_eq!(stats_block_width(LayoutKind::Row, 320.0, 1), 140.0);
}

#[test]
fn grid_table_literals() {
    assert_eq!(stats_block_width(LayoutKind::Grid, 300.0, 4), 300.0);
    assert_eq!(stats_block_width(LayoutKind::Grid, 300.0, 3), 272.0);
    assert_eq!(stats_block_width(LayoutKind::Grid, 300.0, 2), 190.0);
    assert_eq!(stats_block_width(LayoutKind::Grid, 240.0, 2), 160.0);
    assert_eq!(stats_block_width(LayoutKind::Grid, 300.0, 1), 130.0);
}

#[test]
fn formula_layouts_reach_full_width_at_four() {
    for kind in [LayoutKind::Inline, LayoutKind::Right, LayoutKind::Stack] {
        assert_eq!(stats_block_width(kind, 320.0, 4), 320.0, "{kind:?}");
    }
}

#[test]
fn formula_layouts_respect_floor_and_grow() {
    assert_eq!(stats_block_width(LayoutKind::Inline, 320.0, 1), 150.0);
    assert_eq!(stats_block_width(LayoutKind::Inline, 320.0, 2), 205.0);
    assert_eq!(stats_block_width(LayoutKind::Stack, 180.0, 1), 120.0);
    assert_eq!(stats_block_width(LayoutKind::Stack, 200.0, 2), 155.0);
    assert_eq!(stats_block_width(LayoutKind::Right, 156.0, 3), 140.0);
}

#[test]
fn visible_count_is_clamped() {
    assert_eq!(
        stats_block_width(LayoutKind::Row, 320.0, 0),
        stats_block_width(LayoutKind::Row, 320.0, 1)
    );
    assert_eq!(
        stats_block_width(LayoutKind::Grid, 300.0, 9),
        stats_block_width(LayoutKind::Grid, 300.0, 4)
    );
}
