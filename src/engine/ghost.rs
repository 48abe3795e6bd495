use crate::config::RoundConfig;
use crate::constants::{flee_corner, ghost_home};
use crate::engine::motion::Mover;
use crate::engine::utils::{clamp_tile, tunnel_manhattan};
use crate::rng::RandomSource;
use crate::types::{Direction, Personality, Tile};
use crate::world::Grid;

/// What a personality may look at when picking its target.
#[derive(Clone, Copy, Debug)]
pub struct TargetContext {
    pub player_tile: Tile,
    pub player_dir: Direction,
    pub own_tile: Tile,
    pub width: i32,
    pub height: i32,
    pub ambush_lookahead: i32,
    pub flee_distance: i32,
}

impl Personality {
    /// `None` means the ghost ignores targets and always picks at random.
    pub fn target_tile(self, ctx: &TargetContext) -> Option<Tile> {
        match self {
            Personality::DirectChase => Some(ctx.player_tile),
            Personality::Ambush => Some(clamp_tile(
                ctx.player_tile.offset(ctx.player_dir, ctx.ambush_lookahead),
                ctx.width,
                ctx.height,
            )),
            Personality::Erratic => None,
            Personality::Conditional => {
                let distance = tunnel_manhattan(ctx.own_tile, ctx.player_tile, ctx.width);
                if distance > ctx.flee_distance {
                    Some(ctx.player_tile)
                } else {
                    Some(flee_corner(ctx.height))
                }
            }
        }
    }
}

/// Intersection rule shared by every personality. Reversal is only taken when
/// it is the sole walkable option; `None` means the ghost is boxed in.
pub fn choose_direction<R: RandomSource>(
    grid: &Grid,
    mover: &Mover,
    target: Option<Tile>,
    frightened: bool,
    rng: &mut R,
) -> Option<(Direction, Tile)> {
    let reverse = mover.dir.opposite();
    let options: Vec<(Direction, Tile)> = Direction::PRIORITY
        .into_iter()
        .filter(|dir| *dir != reverse)
        .filter_map(|dir| mover.resolve_step(grid, dir).map(|next| (dir, next)))
        .collect();

    if options.is_empty() {
        return mover.resolve_step(grid, reverse).map(|next| (reverse, next));
    }
    if options.len() == 1 {
        return Some(options[0]);
    }

    let target = match target {
        Some(target) if !frightened => target,
        _ => return Some(options[rng.pick_index(options.len())]),
    };

    let mut best = options[0];
    let mut best_distance = tunnel_manhattan(best.1, target, grid.width());
    for &option in &options[1..] {
        let distance = tunnel_manhattan(option.1, target, grid.width());
        if distance < best_distance {
            best = option;
            best_distance = distance;
        }
    }
    Some(best)
}

#[derive(Clone, Debug)]
pub struct GhostAgent {
    pub id: usize,
    pub personality: Personality,
    pub mover: Mover,
}

impl GhostAgent {
    pub fn new(id: usize, personality: Personality) -> Self {
        let (home, dir) = ghost_home(personality);
        Self::with_home(id, personality, home, dir)
    }

    pub fn with_home(id: usize, personality: Personality, home: Tile, dir: Direction) -> Self {
        Self {
            id,
            personality,
            mover: Mover::new(home, dir),
        }
    }

    pub fn speed(&self, config: &RoundConfig) -> f32 {
        match self.personality {
            Personality::DirectChase => config.ghost_speed * config.direct_chase_speed_multiplier,
            _ => config.ghost_speed,
        }
    }

    pub fn send_home(&mut self) {
        self.mover.reset();
    }

    pub fn target_context(
        &self,
        grid: &Grid,
        player_tile: Tile,
        player_dir: Direction,
        config: &RoundConfig,
    ) -> TargetContext {
        TargetContext {
            player_tile,
            player_dir,
            own_tile: self.mover.tile,
            width: grid.width(),
            height: grid.height(),
            ambush_lookahead: config.ambush_lookahead,
            flee_distance: config.conditional_flee_distance,
        }
    }

    /// Decides at tile centers, then moves. Returns whether a tile was reached.
    #[allow(clippy::too_many_arguments)]
    pub fn update<R: RandomSource>(
        &mut self,
        grid: &Grid,
        player_tile: Tile,
        player_dir: Direction,
        frightened: bool,
        dt: f32,
        config: &RoundConfig,
        rng: &mut R,
    ) -> bool {
        if dt <= 0.0 {
            return false;
        }
        if !self.mover.has_target() {
            let ctx = self.target_context(grid, player_tile, player_dir, config);
            let target = self.personality.target_tile(&ctx);
            let Some((dir, next)) = choose_direction(grid, &self.mover, target, frightened, rng)
            else {
                return false;
            };
            self.mover.commit(dir, next);
        }
        self.mover.advance(grid.width(), dt, self.speed(config))
    }
}

#[cfg(test)]
mod tests {
    use crate::config::RoundConfig;
    use crate::constants::{CONDITIONAL_FLEE_DISTANCE, NOMINAL_DT, TICK_RATE, TILE_SIZE};
    use crate::engine::motion::Mover;
    use crate::engine::utils::tunnel_manhattan;
    use crate::rng::{Rng, ScriptedRandom};
    use crate::types::{Direction, Personality, Tile};
    use crate::world::Grid;

    use super::{choose_direction, GhostAgent, TargetContext};

    fn open_room() -> Grid {
        Grid::parse(
            &[
                "#######", //
                "#     #", //
                "#     #", //
                "#     #", //
                "#     #", //
                "#     #", //
                "#######",
            ],
            &[],
        )
        .expect("room parses")
    }

    fn ctx(player: Tile, dir: Direction, own: Tile) -> TargetContext {
        TargetContext {
            player_tile: player,
            player_dir: dir,
            own_tile: own,
            width: 19,
            height: 21,
            ambush_lookahead: 4,
            flee_distance: CONDITIONAL_FLEE_DISTANCE,
        }
    }

    #[test]
    fn direct_chase_targets_player_tile() {
        let c = ctx(Tile::new(5, 6), Direction::Up, Tile::new(1, 1));
        assert_eq!(
            Personality::DirectChase.target_tile(&c),
            Some(Tile::new(5, 6))
        );
    }

    #[test]
    fn ambush_targets_four_ahead_clamped() {
        let c = ctx(Tile::new(5, 6), Direction::Right, Tile::new(1, 1));
        assert_eq!(Personality::Ambush.target_tile(&c), Some(Tile::new(9, 6)));

        let near_edge = ctx(Tile::new(5, 2), Direction::Up, Tile::new(1, 1));
        assert_eq!(
            Personality::Ambush.target_tile(&near_edge),
            Some(Tile::new(5, 0))
        );

        let near_right = ctx(Tile::new(17, 9), Direction::Right, Tile::new(1, 1));
        assert_eq!(
            Personality::Ambush.target_tile(&near_right),
            Some(Tile::new(18, 9))
        );
    }

    #[test]
    fn erratic_has_no_target() {
        let c = ctx(Tile::new(5, 6), Direction::Right, Tile::new(1, 1));
        assert_eq!(Personality::Erratic.target_tile(&c), None);
    }

    #[test]
    fn conditional_chases_when_far_and_flees_when_near() {
        let far = ctx(Tile::new(15, 15), Direction::Left, Tile::new(1, 1));
        assert_eq!(
            Personality::Conditional.target_tile(&far),
            Some(Tile::new(15, 15))
        );

        let at_threshold = ctx(Tile::new(9, 1), Direction::Left, Tile::new(1, 1));
        assert_eq!(
            Personality::Conditional.target_tile(&at_threshold),
            Some(Tile::new(0, 20))
        );

        let near = ctx(Tile::new(3, 3), Direction::Left, Tile::new(1, 1));
        assert_eq!(
            Personality::Conditional.target_tile(&near),
            Some(Tile::new(0, 20))
        );
    }

    #[test]
    fn conditional_distance_is_tunnel_aware() {
        let c = ctx(Tile::new(18, 9), Direction::Left, Tile::new(-1, 9));
        assert_eq!(
            Personality::Conditional.target_tile(&c),
            Some(Tile::new(0, 20))
        );
    }

    #[test]
    fn greedy_choice_minimizes_distance_to_target() {
        let grid = open_room();
        let mover = Mover::new(Tile::new(3, 3), Direction::Up);
        let mut rng = ScriptedRandom::new(vec![0]);
        let choice = choose_direction(&grid, &mover, Some(Tile::new(1, 3)), false, &mut rng);
        assert_eq!(choice, Some((Direction::Left, Tile::new(2, 3))));
        assert_eq!(rng.consumed(), 0);
    }

    #[test]
    fn distance_ties_go_to_first_direction_in_priority_order() {
        let grid = open_room();
        let mover = Mover::new(Tile::new(3, 3), Direction::Left);
        let mut rng = ScriptedRandom::new(vec![0]);
        let choice = choose_direction(&grid, &mover, Some(Tile::new(0, 3)), false, &mut rng);
        assert_eq!(choice, Some((Direction::Left, Tile::new(2, 3))));

        // Every option is one step from the ghost's own tile; Down is first.
        let choice = choose_direction(&grid, &mover, Some(Tile::new(3, 3)), false, &mut rng);
        assert_eq!(choice, Some((Direction::Down, Tile::new(3, 4))));
    }

    #[test]
    fn reversal_is_never_chosen_when_alternatives_exist() {
        let grid = open_room();
        let mover = Mover::new(Tile::new(3, 3), Direction::Left);
        let mut rng = Rng::new(9);
        for _ in 0..200 {
            let choice = choose_direction(&grid, &mover, Some(Tile::new(5, 3)), false, &mut rng);
            assert_ne!(choice.map(|c| c.0), Some(Direction::Right));
            let choice = choose_direction(&grid, &mover, None, true, &mut rng);
            assert_ne!(choice.map(|c| c.0), Some(Direction::Right));
        }
    }

    #[test]
    fn frightened_choice_follows_random_source() {
        let grid = open_room();
        let mover = Mover::new(Tile::new(3, 3), Direction::Up);
        // Non-reversing options in priority order: Right, Left, Up.
        let mut rng = ScriptedRandom::new(vec![0, 1, 2]);
        let target = Some(Tile::new(1, 3));
        let picks: Vec<Direction> = (0..3)
            .filter_map(|_| choose_direction(&grid, &mover, target, true, &mut rng))
            .map(|(dir, _)| dir)
            .collect();
        assert_eq!(picks, vec![Direction::Right, Direction::Left, Direction::Up]);
    }

    #[test]
    fn single_option_is_taken_regardless_of_personality_or_fright() {
        let grid = Grid::parse(
            &[
                "#####", //
                "#   #", //
                "# ###", //
                "#####",
            ],
            &[],
        )
        .expect("elbow parses");
        // At (1,1) moving left: Left and Up are walls, Right would reverse.
        let mover = Mover::new(Tile::new(1, 1), Direction::Left);
        for frightened in [false, true] {
            for target in [None, Some(Tile::new(3, 1)), Some(Tile::new(1, 2))] {
                let mut rng = ScriptedRandom::new(vec![1, 2, 3]);
                let choice = choose_direction(&grid, &mover, target, frightened, &mut rng);
                assert_eq!(choice, Some((Direction::Down, Tile::new(1, 2))));
            }
        }
    }

    #[test]
    fn dead_end_falls_back_to_reversal() {
        let grid = Grid::parse(&["#####", "#   #", "#####"], &[]).expect("corridor parses");
        let mover = Mover::new(Tile::new(3, 1), Direction::Right);
        let mut rng = ScriptedRandom::new(vec![0]);
        let choice = choose_direction(&grid, &mover, Some(Tile::new(3, 1)), false, &mut rng);
        assert_eq!(choice, Some((Direction::Left, Tile::new(2, 1))));
    }

    #[test]
    fn boxed_in_ghost_stays_put() {
        let grid = Grid::parse(&["###", "# #", "###"], &[]).expect("cell parses");
        let mut ghost =
            GhostAgent::with_home(0, Personality::DirectChase, Tile::new(1, 1), Direction::Up);
        let config = RoundConfig::default();
        let mut rng = Rng::new(1);
        let arrived = ghost.update(
            &grid,
            Tile::new(1, 1),
            Direction::Left,
            false,
            0.5,
            &config,
            &mut rng,
        );
        assert!(!arrived);
        assert_eq!(ghost.mover.tile, Tile::new(1, 1));
        assert!(!ghost.mover.has_target());
    }

    #[test]
    fn direct_chase_is_faster() {
        let config = RoundConfig::default();
        let chaser = GhostAgent::new(0, Personality::DirectChase);
        let ambusher = GhostAgent::new(1, Personality::Ambush);
        assert!(chaser.speed(&config) > ambusher.speed(&config));
        assert_eq!(ambusher.speed(&config), config.ghost_speed);
    }

    #[test]
    fn update_commits_and_moves_toward_player() {
        let grid = open_room();
        let mut ghost =
            GhostAgent::with_home(0, Personality::DirectChase, Tile::new(3, 3), Direction::Up);
        let config = RoundConfig {
            ghost_speed: TILE_SIZE,
            direct_chase_speed_multiplier: 1.0,
            ..RoundConfig::default()
        };
        let mut rng = Rng::new(1);
        let arrived = ghost.update(
            &grid,
            Tile::new(5, 3),
            Direction::Left,
            false,
            1.0,
            &config,
            &mut rng,
        );
        assert!(arrived);
        assert_eq!(ghost.mover.tile, Tile::new(4, 3));
        assert_eq!(ghost.mover.dir, Direction::Right);
    }

    #[test]
    fn send_home_clears_target() {
        let grid = open_room();
        let mut ghost =
            GhostAgent::with_home(2, Personality::Erratic, Tile::new(3, 3), Direction::Up);
        let config = RoundConfig::default();
        let mut rng = Rng::new(3);
        ghost.update(
            &grid,
            Tile::new(1, 1),
            Direction::Left,
            false,
            0.01,
            &config,
            &mut rng,
        );
        assert!(ghost.mover.has_target());
        ghost.send_home();
        assert_eq!(ghost.mover.tile, Tile::new(3, 3));
        assert!(!ghost.mover.has_target());
    }

    const PEN: [Tile; 4] = [
        Tile::new(8, 9),
        Tile::new(9, 9),
        Tile::new(10, 9),
        Tile::new(9, 8),
    ];

    /// Runs a ghost against a parked player on the real maze. Returns whether
    /// it ever left its home tile and the closest it got to the player.
    fn hunt_on_maze(
        ghost: &mut GhostAgent,
        player: Tile,
        seconds: u32,
        rng: &mut Rng,
    ) -> (bool, i32) {
        let grid = Grid::new();
        let config = RoundConfig::default();
        let home = ghost.mover.home();
        let mut left_home = false;
        let mut closest = i32::MAX;
        for _ in 0..seconds * TICK_RATE {
            ghost.update(&grid, player, Direction::Left, false, NOMINAL_DT, &config, rng);
            let tile = ghost.mover.tile;
            assert!(
                !PEN.contains(&tile),
                "{:?} entered the pen at {tile:?}",
                ghost.personality
            );
            left_home |= tile != home;
            closest = closest.min(tunnel_manhattan(tile, player, grid.width()));
        }
        (left_home, closest)
    }

    #[test]
    fn every_personality_hunts_from_its_home_on_the_maze() {
        let below_pen = Tile::new(9, 15);
        let above_pen = Tile::new(9, 3);
        for player in [below_pen, above_pen] {
            for (id, personality) in Personality::ALL.into_iter().enumerate() {
                let mut ghost = GhostAgent::new(id, personality);
                let mut rng = Rng::new(17);
                let (left_home, closest) = hunt_on_maze(&mut ghost, player, 12, &mut rng);
                assert!(left_home, "{personality:?} never left home");
                match personality {
                    Personality::DirectChase | Personality::Ambush => assert!(
                        closest <= 1,
                        "{personality:?} stalled {closest} away from {player:?}"
                    ),
                    Personality::Conditional => assert!(
                        closest <= CONDITIONAL_FLEE_DISTANCE + 1,
                        "conditional stalled {closest} away from {player:?}"
                    ),
                    Personality::Erratic => {}
                }
            }
        }
    }

    #[test]
    fn captured_ghosts_hunt_again_after_going_home() {
        let player = Tile::new(9, 15);
        for (id, personality) in [Personality::DirectChase, Personality::Ambush]
            .into_iter()
            .enumerate()
        {
            let mut ghost = GhostAgent::new(id, personality);
            let mut rng = Rng::new(5);
            hunt_on_maze(&mut ghost, player, 4, &mut rng);
            ghost.send_home();
            assert_eq!(ghost.mover.tile, ghost.mover.home());

            let (left_home, closest) = hunt_on_maze(&mut ghost, player, 12, &mut rng);
            assert!(left_home);
            assert!(closest <= 1, "{personality:?} stalled {closest} away after send_home");
        }
    }
}
