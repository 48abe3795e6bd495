use crate::types::Tile;

pub(crate) fn manhattan(ax: i32, ay: i32, bx: i32, by: i32) -> i32 {
    (ax - bx).abs() + (ay - by).abs()
}

/// Column a tunnel sentinel stands for: one past either boundary maps to the
/// opposite boundary column.
pub(crate) fn effective_col(col: i32, width: i32) -> i32 {
    if col < 0 {
        width - 1
    } else if col >= width {
        0
    } else {
        col
    }
}

pub(crate) fn tunnel_manhattan(a: Tile, b: Tile, width: i32) -> i32 {
    manhattan(
        effective_col(a.col, width),
        a.row,
        effective_col(b.col, width),
        b.row,
    )
}

pub(crate) fn clamp_tile(tile: Tile, width: i32, height: i32) -> Tile {
    Tile::new(
        tile.col.clamp(0, (width - 1).max(0)),
        tile.row.clamp(0, (height - 1).max(0)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_columns_map_to_opposite_boundary() {
        assert_eq!(effective_col(-1, 19), 18);
        assert_eq!(effective_col(19, 19), 0);
        assert_eq!(effective_col(7, 19), 7);
    }

    #[test]
    fn tunnel_manhattan_uses_effective_columns() {
        let sentinel = Tile::new(-1, 9);
        assert_eq!(tunnel_manhattan(sentinel, Tile::new(18, 9), 19), 0);
        assert_eq!(tunnel_manhattan(sentinel, Tile::new(16, 7), 19), 4);
        assert_eq!(tunnel_manhattan(Tile::new(1, 1), Tile::new(4, 5), 19), 7);
    }

    #[test]
    fn clamp_tile_keeps_targets_on_the_grid() {
        assert_eq!(clamp_tile(Tile::new(-3, 25), 19, 21), Tile::new(0, 20));
        assert_eq!(clamp_tile(Tile::new(22, -1), 19, 21), Tile::new(18, 0));
        assert_eq!(clamp_tile(Tile::new(5, 5), 19, 21), Tile::new(5, 5));
    }
}
