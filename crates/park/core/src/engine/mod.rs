//! Query/Execute dispatcher.
//!
//! [`ParkEngine`] is the single writer of [`WorldState`]. Every top-level
//! action passes through the same pipeline:
//!
//! gate (pause, editor, permission) → pre_validate → funds → apply → book
//!
//! Query stops after the funds check and never mutates. Execute runs `apply`
//! against a working copy that replaces the world only when the result is
//! `Ok`, so a refusal at any step leaves the world untouched.

pub mod nested;
pub(crate) mod transition;

pub use nested::{NestedBatch, execute_nested, query_nested};
pub use transition::TransitionPhase;

use crate::action::{
    Action, ActionContext, ActionFlags, ActionResult, CommandFlags, SessionMode, Status,
};
use crate::env::{ParkEnv, StringId};
use crate::finance::Finance;
use crate::state::WorldState;

/// Dispatcher bound to one world.
pub struct ParkEngine<'a> {
    world: &'a mut WorldState,
    mode: SessionMode,
}

impl<'a> ParkEngine<'a> {
    pub fn new(world: &'a mut WorldState) -> Self {
        Self {
            world,
            mode: SessionMode::Play,
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: SessionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn world(&self) -> &WorldState {
        self.world
    }

    /// Validates `action` and previews its cost. Never mutates.
    pub fn query(&self, env: ParkEnv<'_>, action: &Action) -> ActionResult {
        query(self.world, env, self.mode, action)
    }

    /// Validates and commits `action`.
    ///
    /// On `Ok` the world is replaced by the mutated working copy and the cost
    /// is booked with the finance ledger unless the context carries `GHOST` or
    /// `NO_SPEND`. On any refusal the world is left exactly as it was.
    pub fn execute(&mut self, env: ParkEnv<'_>, action: &Action) -> ActionResult {
        let cx = context(env, self.mode, action);

        if let Err(refusal) = gate(self.world, &cx, action, true) {
            trace_dispatch("execute", action, &refusal);
            return refusal;
        }

        let mut working = self.world.clone();
        let result = action.body().execute_in(&cx, &mut working, true);
        if !result.is_ok() {
            trace_dispatch("execute", action, &result);
            return result;
        }

        *self.world = working;
        if result.cost != 0 && cx.flags.charges_funds() && !self.world.park.no_money {
            self.world.finance.apply(result.cost, result.expenditure);
        }

        trace_dispatch("execute", action, &result);
        result
    }
}

/// Validates `action` against `world` without mutating it.
///
/// Runs every check Execute runs except the pause gate, which only applies to
/// committing calls.
pub fn query(
    world: &WorldState,
    env: ParkEnv<'_>,
    mode: SessionMode,
    action: &Action,
) -> ActionResult {
    let cx = context(env, mode, action);
    let result = match gate(world, &cx, action, false) {
        Ok(()) => action.body().query_in(&cx, world, true),
        Err(refusal) => refusal,
    };
    trace_dispatch("query", action, &result);
    result
}

fn context<'a>(env: ParkEnv<'a>, mode: SessionMode, action: &Action) -> ActionContext<'a> {
    ActionContext::new(env, action.actor, action.flags).with_mode(mode)
}

/// Static-flag and permission gating for top-level calls.
fn gate(
    world: &WorldState,
    cx: &ActionContext<'_>,
    action: &Action,
    committing: bool,
) -> Result<(), ActionResult> {
    check_gate(world, cx, action, committing)
        .map_err(|refusal| transition::refused_at(action.kind(), TransitionPhase::Gate, refusal))
}

fn check_gate(
    world: &WorldState,
    cx: &ActionContext<'_>,
    action: &Action,
    committing: bool,
) -> Result<(), ActionResult> {
    let body = action.body();
    let flags = body.action_flags();
    let title = body.title();

    // Local-only work never travels; a networked copy of it is malformed.
    if cx.flags.contains(CommandFlags::NETWORKED)
        && (flags.contains(ActionFlags::CLIENT_ONLY) || cx.is_ghost())
    {
        return Err(ActionResult::error(
            Status::Disallowed,
            title,
            StringId::NotAllowedOverNetwork,
        ));
    }

    if committing
        && world.park.paused
        && !cx.is_ghost()
        && !flags.contains(ActionFlags::ALLOW_WHILE_PAUSED)
        && !world.cheats.build_in_pause_mode
    {
        return Err(ActionResult::error(
            Status::GamePaused,
            title,
            StringId::ConstructionNotPossibleWhilePaused,
        ));
    }

    if flags.contains(ActionFlags::EDITOR_ONLY) && cx.mode != SessionMode::Editor {
        return Err(ActionResult::error(
            Status::Disallowed,
            title,
            StringId::EditorOnly,
        ));
    }

    if let Some(actor) = cx.actor {
        let required = body.required_permission();
        if !world.players.permissions(actor).contains(required) {
            return Err(ActionResult::error(
                Status::Disallowed,
                title,
                StringId::PermissionDenied,
            ));
        }
    }

    Ok(())
}

fn trace_dispatch(phase: &'static str, action: &Action, result: &ActionResult) {
    tracing::debug!(
        target: "park::engine",
        phase,
        kind = action.as_snake_case(),
        actor = ?action.actor,
        network_id = ?action.network_id,
        status = %result.status,
        cost = result.cost,
        "dispatched"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{
        BannerPlace, BannerSetColour, CommandFlags, CommandKind, FootpathPlace, LandSetRights,
        RideCreate, RideDemolish, TogglePause, TrackPlace,
    };
    use crate::config::EngineConfig;
    use crate::env::{EnglishStrings, Env, StaticObjects};
    use crate::finance::ExpenditureType;
    use crate::state::{
        BannerIndex, CoordsXY, CoordsXYZ, CoordsXYZD, OwnershipFlags, PathElement, PlayerId,
        RideId, RideType, TileCoordsXY,
    };

    const BANNER_Z: i32 = 14 * EngineConfig::COORDS_Z_STEP;

    fn owned_world() -> WorldState {
        let mut world = WorldState::new(&EngineConfig::with_map_size(16));
        for tile in world.map.tiles_mut() {
            tile.ownership = OwnershipFlags::OWNED;
        }
        world
    }

    fn with_path(mut world: WorldState, coords: CoordsXY) -> WorldState {
        if let Some(tile) = world.map.tile_at_mut(coords) {
            tile.path = Some(PathElement {
                height: 14,
                ghost: false,
            });
        }
        world
    }

    fn place_banner(x: i32, y: i32) -> Action {
        Action::new(BannerPlace {
            loc: CoordsXYZD::new(x, y, BANNER_Z, 0),
            banner_type: 0,
            colour: 2,
        })
        .with_actor(PlayerId::HOST)
    }

    fn env<'a>(objects: &'a StaticObjects, strings: &'a EnglishStrings) -> ParkEnv<'a> {
        Env::with_all(objects, strings).as_park_env()
    }

    #[test]
    fn off_map_banner_is_refused_without_effect() {
        let objects = StaticObjects::default();
        let strings = EnglishStrings;
        let world = owned_world();
        let before = world.clone();

        let result = query(&world, env(&objects, &strings), SessionMode::Play, &place_banner(-64, 64));

        assert_eq!(result.status, Status::InvalidParameters);
        assert_eq!(result.error_detail, Some(StringId::OffEdgeOfMap));
        assert_eq!(result.cost, 0);
        assert_eq!(world, before);
    }

    #[test]
    fn banner_purchase_charges_price_and_marks_redraw() {
        let objects = StaticObjects::default();
        let strings = EnglishStrings;
        let mut world = with_path(owned_world(), CoordsXY::new(64, 64));
        let cash = world.finance.funds();

        let result =
            ParkEngine::new(&mut world).execute(env(&objects, &strings), &place_banner(64, 64));

        assert!(result.is_ok(), "{result:?}");
        assert_eq!(result.cost, -StaticObjects::DEFAULT_BANNER_PRICE);
        assert_eq!(result.banner(), Some(BannerIndex(0)));
        assert_eq!(world.finance.funds(), cash - StaticObjects::DEFAULT_BANNER_PRICE);
        assert_eq!(world.banners.len(), 1);
        assert!(world.invalidations().contains(&TileCoordsXY::new(2, 2)));
    }

    #[test]
    fn query_is_idempotent_and_pure() {
        let objects = StaticObjects::default();
        let strings = EnglishStrings;
        let world = with_path(owned_world(), CoordsXY::new(64, 64));
        let before = world.clone();
        let action = place_banner(64, 64);

        let first = query(&world, env(&objects, &strings), SessionMode::Play, &action);
        let second = query(&world, env(&objects, &strings), SessionMode::Play, &action);

        assert_eq!(first, second);
        assert_eq!(world, before);
        assert!(first.is_ok());
        // Query previews the creation but never reports an index it did not allocate.
        assert_eq!(first.banner(), None);
    }

    #[test]
    fn execute_never_fixes_a_query_refusal() {
        let objects = StaticObjects::default();
        let strings = EnglishStrings;
        let actions = [
            place_banner(-64, 64),
            place_banner(96, 96),
            Action::new(BannerSetColour {
                banner: BannerIndex(0),
                colour: 40,
            }),
            Action::new(LandSetRights::default()),
            Action::new(RideDemolish { ride: RideId(7) }),
        ];

        for action in actions {
            let mut world = with_path(owned_world(), CoordsXY::new(64, 64));
            let before = world.clone();
            let queried = query(&world, env(&objects, &strings), SessionMode::Play, &action);
            assert!(!queried.is_ok(), "{action:?}");

            let executed = ParkEngine::new(&mut world).execute(env(&objects, &strings), &action);
            assert_eq!(executed.status, queried.status, "{action:?}");
            assert_eq!(world, before, "{action:?}");
        }
    }

    #[test]
    fn bad_colour_refused_in_both_phases() {
        let objects = StaticObjects::default();
        let strings = EnglishStrings;
        let mut world = with_path(owned_world(), CoordsXY::new(64, 64));
        let placed =
            ParkEngine::new(&mut world).execute(env(&objects, &strings), &place_banner(64, 64));
        let banner = placed.banner().expect("banner placed");

        let action = Action::new(BannerSetColour {
            banner,
            colour: EngineConfig::COLOUR_COUNT,
        });
        let queried = query(&world, env(&objects, &strings), SessionMode::Play, &action);
        let executed = ParkEngine::new(&mut world).execute(env(&objects, &strings), &action);

        assert_eq!(queried.status, Status::InvalidParameters);
        assert_eq!(executed.status, Status::InvalidParameters);
        assert_eq!(executed.error_detail, Some(StringId::InvalidColour));
    }

    #[test]
    fn paused_park_refuses_construction_but_not_toggle_pause() {
        let objects = StaticObjects::default();
        let strings = EnglishStrings;
        let mut world = with_path(owned_world(), CoordsXY::new(64, 64));
        world.park.paused = true;

        let refused =
            ParkEngine::new(&mut world).execute(env(&objects, &strings), &place_banner(64, 64));
        assert_eq!(refused.status, Status::GamePaused);
        assert_eq!(
            refused.error_detail,
            Some(StringId::ConstructionNotPossibleWhilePaused)
        );

        // Query previews regardless of pause.
        let preview = query(&world, env(&objects, &strings), SessionMode::Play, &place_banner(64, 64));
        assert!(preview.is_ok());

        let unpause = Action::new(TogglePause).with_actor(PlayerId::HOST);
        let result = ParkEngine::new(&mut world).execute(env(&objects, &strings), &unpause);
        assert!(result.is_ok());
        assert!(!world.park.paused);
    }

    #[test]
    fn build_in_pause_cheat_lifts_the_pause_gate() {
        let objects = StaticObjects::default();
        let strings = EnglishStrings;
        let mut world = with_path(owned_world(), CoordsXY::new(64, 64));
        world.park.paused = true;
        world.cheats.build_in_pause_mode = true;

        let result =
            ParkEngine::new(&mut world).execute(env(&objects, &strings), &place_banner(64, 64));

        assert!(result.is_ok(), "{result:?}");
    }

    #[test]
    fn ghost_previews_run_while_paused() {
        let objects = StaticObjects::default();
        let strings = EnglishStrings;
        let mut world = owned_world();
        world.park.paused = true;
        let ghost = Action::new(FootpathPlace {
            loc: CoordsXYZ::new(64, 64, BANNER_Z),
        })
        .with_flags(CommandFlags::GHOST);

        let result = ParkEngine::new(&mut world).execute(env(&objects, &strings), &ghost);

        assert!(result.is_ok(), "{result:?}");
        let tile = world.map.tile_at(CoordsXY::new(64, 64)).expect("tile");
        assert_eq!(tile.path.map(|path| path.ghost), Some(true));

        let real = Action::new(FootpathPlace {
            loc: CoordsXYZ::new(96, 64, BANNER_Z),
        });
        let refused = ParkEngine::new(&mut world).execute(env(&objects, &strings), &real);
        assert_eq!(refused.status, Status::GamePaused);
    }

    #[test]
    fn networked_ghosts_are_refused() {
        let objects = StaticObjects::default();
        let strings = EnglishStrings;
        let mut world = owned_world();
        let before = world.clone();
        let action = Action::new(FootpathPlace {
            loc: CoordsXYZ::new(64, 64, BANNER_Z),
        })
        .with_flags(CommandFlags::GHOST | CommandFlags::NETWORKED);

        let queried = query(&world, env(&objects, &strings), SessionMode::Play, &action);
        let executed = ParkEngine::new(&mut world).execute(env(&objects, &strings), &action);

        for result in [queried, executed] {
            assert_eq!(result.status, Status::Disallowed);
            assert_eq!(result.error_detail, Some(StringId::NotAllowedOverNetwork));
        }
        assert_eq!(world, before);

        let plain = Action::new(FootpathPlace {
            loc: CoordsXYZ::new(64, 64, BANNER_Z),
        })
        .with_flags(CommandFlags::NETWORKED | CommandFlags::APPLY);
        assert!(ParkEngine::new(&mut world).execute(env(&objects, &strings), &plain).is_ok());
    }

    #[test]
    fn editor_only_requires_editor_mode() {
        let objects = StaticObjects::default();
        let strings = EnglishStrings;
        let mut world = owned_world();
        let action = Action::new(LandSetRights::default());

        let refused = ParkEngine::new(&mut world).execute(env(&objects, &strings), &action);
        assert_eq!(refused.status, Status::Disallowed);
        assert_eq!(refused.error_detail, Some(StringId::EditorOnly));

        let accepted = ParkEngine::new(&mut world)
            .with_mode(SessionMode::Editor)
            .execute(env(&objects, &strings), &action);
        assert!(accepted.is_ok(), "{accepted:?}");
    }

    #[test]
    fn actor_without_permission_is_refused() {
        let objects = StaticObjects::default();
        let strings = EnglishStrings;
        let mut world = with_path(owned_world(), CoordsXY::new(64, 64));
        let guest = PlayerId(9);
        world.players.join(guest, "guest");

        let action = Action::new(BannerPlace {
            loc: CoordsXYZD::new(64, 64, BANNER_Z, 0),
            banner_type: 0,
            colour: 0,
        })
        .with_actor(guest);

        let queried = query(&world, env(&objects, &strings), SessionMode::Play, &action);
        assert_eq!(queried.status, Status::Disallowed);
        assert_eq!(queried.error_detail, Some(StringId::PermissionDenied));

        // System-issued actions carry no actor and are not permission checked.
        let system = Action::new(BannerPlace {
            loc: CoordsXYZD::new(64, 64, BANNER_Z, 0),
            banner_type: 0,
            colour: 0,
        });
        assert!(query(&world, env(&objects, &strings), SessionMode::Play, &system).is_ok());
    }

    #[test]
    fn insufficient_funds_refused_in_both_phases() {
        let objects = StaticObjects::default();
        let strings = EnglishStrings;
        let mut world = with_path(owned_world(), CoordsXY::new(64, 64));
        world.finance.set_cash(10);
        let before = world.clone();

        let queried = query(&world, env(&objects, &strings), SessionMode::Play, &place_banner(64, 64));
        let executed =
            ParkEngine::new(&mut world).execute(env(&objects, &strings), &place_banner(64, 64));

        assert_eq!(queried.status, Status::InsufficientFunds);
        assert_eq!(executed.status, Status::InsufficientFunds);
        assert_eq!(executed.error_detail, Some(StringId::NotEnoughCash));
        assert_eq!(world, before);
    }

    #[test]
    fn ghost_and_no_spend_are_never_charged() {
        let objects = StaticObjects::default();
        let strings = EnglishStrings;

        for flags in [CommandFlags::GHOST, CommandFlags::NO_SPEND] {
            let mut world = with_path(owned_world(), CoordsXY::new(64, 64));
            world.finance.set_cash(0);

            let result = ParkEngine::new(&mut world)
                .execute(env(&objects, &strings), &place_banner(64, 64).with_flags(flags));

            assert!(result.is_ok(), "{flags:?}: {result:?}");
            assert_eq!(result.cost, -StaticObjects::DEFAULT_BANNER_PRICE);
            assert_eq!(world.finance.funds(), 0);
            assert_eq!(world.finance.expenditure(ExpenditureType::Landscaping), 0);
        }
    }

    #[test]
    fn no_money_parks_skip_funds_entirely() {
        let objects = StaticObjects::default();
        let strings = EnglishStrings;
        let mut world = with_path(owned_world(), CoordsXY::new(64, 64));
        world.finance.set_cash(0);
        world.park.no_money = true;

        let result =
            ParkEngine::new(&mut world).execute(env(&objects, &strings), &place_banner(64, 64));

        assert!(result.is_ok(), "{result:?}");
        assert_eq!(world.finance.funds(), 0);
    }

    #[test]
    fn missing_object_oracle_degrades_to_unknown() {
        let strings = EnglishStrings;
        let mut world = with_path(owned_world(), CoordsXY::new(64, 64));
        let before = world.clone();
        let env = Env::<StaticObjects, EnglishStrings>::new(None, Some(&strings)).as_park_env();

        let result = ParkEngine::new(&mut world).execute(env, &place_banner(64, 64));

        assert_eq!(result.status, Status::Unknown);
        assert_eq!(result.error_detail, Some(StringId::ObjectDataUnavailable));
        assert_eq!(world, before);
    }

    #[test]
    fn maze_demolish_refunds_every_segment() {
        let objects = StaticObjects::default();
        let strings = EnglishStrings;
        let mut world = owned_world();
        let mut engine = ParkEngine::new(&mut world);

        let created = engine.execute(
            env(&objects, &strings),
            &Action::new(RideCreate {
                ride_type: RideType::Maze as u8,
                colour: 0,
            }),
        );
        let ride = created.ride().expect("ride created");

        let segments = [(64, 64), (96, 64), (128, 64)];
        for (x, y) in segments {
            let placed = engine.execute(
                env(&objects, &strings),
                &Action::new(TrackPlace {
                    ride,
                    loc: CoordsXYZD::new(x, y, BANNER_Z, 0),
                    track_type: 0,
                }),
            );
            assert!(placed.is_ok(), "{placed:?}");
        }
        let funds_before = engine.world().finance.funds();

        let demolished = engine.execute(env(&objects, &strings), &Action::new(RideDemolish { ride }));

        assert!(demolished.is_ok(), "{demolished:?}");
        let refund = 3 * EngineConfig::refund_of(24);
        assert_eq!(demolished.cost, refund);
        assert_eq!(demolished.expenditure, ExpenditureType::RideConstruction);
        assert_eq!(demolished.nested().map(|s| s.steps), Some(3));
        assert_eq!(engine.world().finance.funds(), funds_before + refund);
        assert!(engine.world().rides.get(ride).is_none());
        assert!(engine.world().map.tiles().all(|tile| tile.elements.is_empty()));
    }

    #[test]
    fn failed_nested_removal_aborts_the_whole_demolish() {
        let objects = StaticObjects::default();
        let strings = EnglishStrings;
        let mut world = owned_world();
        let ride = {
            let mut engine = ParkEngine::new(&mut world);
            let created = engine.execute(
                env(&objects, &strings),
                &Action::new(RideCreate {
                    ride_type: RideType::Maze as u8,
                    colour: 0,
                }),
            );
            let ride = created.ride().expect("ride created");
            for x in [64, 96] {
                let placed = engine.execute(
                    env(&objects, &strings),
                    &Action::new(TrackPlace {
                        ride,
                        loc: CoordsXYZD::new(x, 64, BANNER_Z, 0),
                        track_type: 0,
                    }),
                );
                assert!(placed.is_ok(), "{placed:?}");
            }
            ride
        };

        // A segment on land the park no longer owns cannot be removed.
        if let Some(tile) = world.map.tile_at_mut(CoordsXY::new(96, 64)) {
            tile.ownership = OwnershipFlags::empty();
        }
        let before = world.clone();

        let result =
            ParkEngine::new(&mut world).execute(env(&objects, &strings), &Action::new(RideDemolish { ride }));

        assert_eq!(result.status, Status::NotOwned);
        assert_eq!(result.error_title, Some(StringId::CantDemolishRide));
        let summary = result.nested().expect("nested summary");
        assert_eq!(summary.steps, 1);
        assert_eq!(summary.failed_step, Some(1));
        assert_eq!(summary.failed_kind, Some(CommandKind::TrackRemove));
        assert_eq!(world, before);
    }

    #[test]
    fn footpath_cost_is_booked_under_landscaping() {
        let objects = StaticObjects::default();
        let strings = EnglishStrings;
        let mut world = owned_world();
        let cash = world.finance.funds();

        let result = ParkEngine::new(&mut world).execute(
            env(&objects, &strings),
            &Action::new(FootpathPlace {
                loc: CoordsXYZ::new(64, 64, BANNER_Z),
            }),
        );

        assert!(result.is_ok(), "{result:?}");
        assert_eq!(world.finance.funds(), cash - EngineConfig::FOOTPATH_PRICE);
        assert_eq!(
            world.finance.expenditure(ExpenditureType::Landscaping),
            -EngineConfig::FOOTPATH_PRICE
        );
    }
}
