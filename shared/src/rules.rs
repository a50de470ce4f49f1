use crate::grid::Grid;

pub use crate::grid::MAX_GENERATIONS;

/// Count the living cells among the eight toroidal neighbors of a cell.
/// Only aliveness matters here, never the age itself.
pub fn count_living_neighbors(grid: &Grid, row: isize, col: isize) -> u8 {
    let mut count = 0;
    // Wrap first so the offsets below cannot overflow.
    let (row, col) = grid.wrap(row, col);
    let (row, col) = (row as isize, col as isize);

    for dr in [-1, 0, 1].iter() {
        for dc in [-1, 0, 1].iter() {
            if *dr == 0 && *dc == 0 {
                // Skip the current cell
                continue;
            }
            if grid.is_alive_at(row + dr, col + dc) {
                count += 1;
            }
        }
    }

    count
}

/// Age of a cell that is alive in the next generation. Newborns start at 1,
/// survivors count up and wrap from `max_age - 1` back to 1. `max_age` is
/// clamped to `2..=MAX_GENERATIONS`, since grids cannot hold older cells.
pub fn next_age(age: u8, max_age: u8) -> u8 {
    let max_age = max_age.clamp(2, MAX_GENERATIONS);
    age % (max_age - 1) + 1
}

/// Compute the next generation as a fresh grid; `grid` itself is untouched.
pub fn step_generation(grid: &Grid, max_age: u8) -> Grid {
    let mut next = grid.clone();

    for row in 0..grid.size() as isize {
        for col in 0..grid.size() as isize {
            let age = grid.get(row, col);
            let next_state = match (age, count_living_neighbors(grid, row, col)) {
                (1.., 2) | (_, 3) => next_age(age, max_age), // Survives or is born
                _ => 0,                                      // Dies or remains dead
            };
            next.set(row, col, next_state);
        }
    }

    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn grid_from(rows: &[&[u8]]) -> Grid {
        let mut grid = Grid::new(rows.len()).unwrap();
        for (r, row) in rows.iter().enumerate() {
            for (c, &age) in row.iter().enumerate() {
                grid.set(r as isize, c as isize, age);
            }
        }
        grid
    }

    fn random_aged_grid(rng: &mut StdRng, size: usize) -> Grid {
        let mut grid = Grid::new(size).unwrap();
        for row in 0..size as isize {
            for col in 0..size as isize {
                if rng.random_bool(0.4) {
                    grid.set(row, col, rng.random_range(1..MAX_GENERATIONS));
                }
            }
        }
        grid
    }

    #[test]
    fn corner_counts_wrap_on_small_torus() {
        let mut grid = Grid::new(4).unwrap();
        grid.set(3, 3, 1);
        grid.set(0, 3, 1);
        grid.set(3, 0, 1);
        assert_eq!(count_living_neighbors(&grid, 0, 0), 3);
        assert_eq!(count_living_neighbors(&grid, 3, 3), 2);
        assert_eq!(count_living_neighbors(&grid, 1, 1), 0);
    }

    #[test]
    fn counts_at_extreme_coordinates() {
        let mut grid = Grid::new(3).unwrap();
        grid.set(0, 1, 1);
        grid.set(2, 2, 1);
        grid.set(1, 0, 1);
        let size = grid.size() as isize;
        for coord in [isize::MAX, isize::MIN, isize::MAX - 1, isize::MIN + 1] {
            let wrapped = coord.rem_euclid(size);
            assert_eq!(
                count_living_neighbors(&grid, coord, 0),
                count_living_neighbors(&grid, wrapped, 0)
            );
            assert_eq!(
                count_living_neighbors(&grid, 1, coord),
                count_living_neighbors(&grid, 1, wrapped)
            );
            assert_eq!(
                count_living_neighbors(&grid, coord, coord),
                count_living_neighbors(&grid, wrapped, wrapped)
            );
        }
    }

    #[test]
    fn fully_alive_torus_counts_eight() {
        let mut grid = Grid::new(4).unwrap();
        for row in 0..4 {
            for col in 0..4 {
                grid.set(row, col, 1);
            }
        }
        assert_eq!(count_living_neighbors(&grid, 0, 0), 8);
        assert_eq!(count_living_neighbors(&grid, 3, 0), 8);
    }

    #[test]
    fn counts_ignore_ages() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            let grid = random_aged_grid(&mut rng, 9);
            let binary = grid.to_binary();
            for row in 0..9 {
                for col in 0..9 {
                    assert_eq!(
                        count_living_neighbors(&grid, row, col),
                        count_living_neighbors(&binary, row, col)
                    );
                }
            }
        }
    }

    #[test]
    fn counts_are_invariant_under_full_turns() {
        let glider = grid_from(&[
            &[0, 1, 0, 0, 0, 0],
            &[0, 0, 1, 0, 0, 0],
            &[1, 1, 1, 0, 0, 0],
            &[0, 0, 0, 0, 0, 0],
            &[0, 0, 0, 0, 0, 0],
            &[0, 0, 0, 0, 0, 0],
        ]);
        let size = glider.size() as isize;
        for k in [-2, -1, 1, 3] {
            for row in 0..size {
                for col in 0..size {
                    let base = count_living_neighbors(&glider, row, col);
                    assert_eq!(count_living_neighbors(&glider, row + k * size, col), base);
                    assert_eq!(count_living_neighbors(&glider, row, col + k * size), base);
                }
            }
        }
    }

    #[test]
    fn blinker_on_three_by_three_torus() {
        let grid = grid_from(&[&[0, 1, 0], &[0, 1, 0], &[0, 1, 0]]);

        // Every cell sees all eight others: the column has 2 living
        // neighbors and survives, every other cell has 3 and is born.
        let next = step_generation(&grid, MAX_GENERATIONS);
        assert_eq!(next, grid_from(&[&[1, 2, 1], &[1, 2, 1], &[1, 2, 1]]));

        // Now everything has 8 neighbors and dies.
        let after = step_generation(&next, MAX_GENERATIONS);
        assert!(after.is_empty());
    }

    #[test]
    fn blinker_oscillates_on_larger_torus() {
        let vertical = grid_from(&[
            &[0, 0, 0, 0, 0],
            &[0, 0, 1, 0, 0],
            &[0, 0, 1, 0, 0],
            &[0, 0, 1, 0, 0],
            &[0, 0, 0, 0, 0],
        ]);
        let horizontal = step_generation(&vertical, MAX_GENERATIONS);
        assert_eq!(
            horizontal,
            grid_from(&[
                &[0, 0, 0, 0, 0],
                &[0, 0, 0, 0, 0],
                &[0, 1, 2, 1, 0],
                &[0, 0, 0, 0, 0],
                &[0, 0, 0, 0, 0],
            ])
        );
        let back = step_generation(&horizontal, MAX_GENERATIONS);
        assert_eq!(back.to_binary(), vertical);
        assert_eq!(back.get(2, 2), 3);
    }

    #[test]
    fn isolated_cell_dies() {
        let mut grid = Grid::new(20).unwrap();
        grid.set(10, 10, 5);
        let next = step_generation(&grid, MAX_GENERATIONS);
        assert_eq!(next.get(10, 10), 0);
        assert!(next.is_empty());
    }

    #[test]
    fn still_life_ages_wrap_without_dying() {
        let mut grid = Grid::new(6).unwrap();
        for (row, col) in [(1, 1), (1, 2), (2, 1), (2, 2)] {
            grid.set(row, col, 1);
        }
        let mut seen = Vec::new();
        for _ in 0..(MAX_GENERATIONS as usize * 2) {
            grid = step_generation(&grid, MAX_GENERATIONS);
            assert_eq!(grid.live_count(), 4);
            seen.push(grid.get(1, 1));
        }
        assert_eq!(&seen[..9], &[2, 3, 4, 5, 6, 7, 8, 9, 1]);
        assert!(seen.iter().all(|&age| (1..MAX_GENERATIONS).contains(&age)));
    }

    #[test]
    fn next_age_never_returns_zero() {
        for max_age in 0..=12 {
            for age in 0..MAX_GENERATIONS {
                let next = next_age(age, max_age);
                assert!(next >= 1);
                assert!(next < max_age.clamp(2, MAX_GENERATIONS));
            }
        }
        assert_eq!(next_age(0, MAX_GENERATIONS), 1);
        assert_eq!(next_age(9, MAX_GENERATIONS), 1);
    }

    #[test]
    fn age_cap_is_limited_to_grid_range() {
        let mut block = Grid::new(6).unwrap();
        for (row, col) in [(1, 1), (1, 2), (2, 1), (2, 2)] {
            block.set(row, col, 1);
        }

        let ages = |max_age: u8| {
            let mut grid = block.clone();
            (0..12)
                .map(|_| {
                    grid = step_generation(&grid, max_age);
                    grid.get(1, 1)
                })
                .collect::<Vec<_>>()
        };

        assert_eq!(ages(4), vec![2, 3, 1, 2, 3, 1, 2, 3, 1, 2, 3, 1]);
        assert_eq!(ages(20), ages(MAX_GENERATIONS));
        assert_eq!(next_age(9, 20), 1);
    }

    #[test]
    fn stepping_is_deterministic() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..10 {
            let grid = random_aged_grid(&mut rng, 12);
            assert_eq!(step_generation(&grid, MAX_GENERATIONS), step_generation(&grid, MAX_GENERATIONS));
        }
    }

    #[test]
    fn no_cell_is_alive_at_age_zero() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut grid = random_aged_grid(&mut rng, 16);
        for _ in 0..30 {
            let next = step_generation(&grid, MAX_GENERATIONS);
            for row in 0..16 {
                for col in 0..16 {
                    let n = count_living_neighbors(&grid, row, col);
                    let was_alive = grid.is_alive_at(row, col);
                    let lives = n == 3 || (was_alive && n == 2);
                    assert_eq!(next.is_alive_at(row, col), lives);
                    assert!(next.get(row, col) < MAX_GENERATIONS);
                }
            }
            grid = next;
        }
    }
}
