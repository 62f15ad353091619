//! Skirmish game implementation.

use im::{OrdMap, Vector};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::core::{
    ActionFailed, MapError, PlayerId, PlayerMap, Position, PrimitiveAction, UnitId, UnitTypeId,
};
use crate::engine::{CityView, Snapshot, UnitView};

/// Infantry: sturdy, slow to dispatch.
pub const INFANTRY: UnitTypeId = UnitTypeId::new(1);
/// Scout: fragile, dispatched every cycle.
pub const SCOUT: UnitTypeId = UnitTypeId::new(2);
/// Cavalry: strongest, slowest to produce.
pub const CAVALRY: UnitTypeId = UnitTypeId::new(3);

/// Static stats of a unit type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnitTypeSpec {
    pub id: UnitTypeId,
    pub name: &'static str,
    pub hp: u32,
    pub damage: u32,
    pub production_ms: u64,
}

const UNIT_TYPES: [UnitTypeSpec; 3] = [
    UnitTypeSpec { id: INFANTRY, name: "Infantry", hp: 10, damage: 3, production_ms: 5_000 },
    UnitTypeSpec { id: SCOUT, name: "Scout", hp: 5, damage: 1, production_ms: 3_000 },
    UnitTypeSpec { id: CAVALRY, name: "Cavalry", hp: 12, damage: 4, production_ms: 8_000 },
];

/// Look up the stats of a unit type.
#[must_use]
pub fn unit_type_spec(id: UnitTypeId) -> Option<&'static UnitTypeSpec> {
    UNIT_TYPES.iter().find(|spec| spec.id == id)
}

const CITY_SCORE: f64 = 10.0;

/// Terrain of one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Terrain {
    Grass,
    Forest,
    Mountain,
    Water,
}

impl Terrain {
    /// Can units stand on this terrain?
    #[must_use]
    pub fn is_passable(self) -> bool {
        matches!(self, Terrain::Grass | Terrain::Forest)
    }
}

#[derive(Clone, Copy, Debug)]
struct Tile {
    terrain: Terrain,
    known: bool,
}

#[derive(Clone, Copy, Debug)]
struct Unit {
    id: UnitId,
    owner: PlayerId,
    position: Position,
    unit_type: UnitTypeId,
    hp: u32,
}

impl Unit {
    fn view(&self) -> UnitView {
        UnitView {
            id: self.id,
            owner: self.owner,
            position: self.position,
            unit_type: self.unit_type,
            hp: self.hp,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct City {
    position: Position,
    owner: PlayerId,
    producing: Option<UnitTypeId>,
    progress_ms: u64,
}

#[derive(Clone, Copy, Debug)]
struct ScheduledAction {
    at_ms: u64,
    seq: u64,
    player: PlayerId,
    action: PrimitiveAction,
}

/// A small real-time grid game with fog of war.
///
/// All collections are `im` persistent structures, so `copy` shares
/// structure with the source and costs O(1) until one side is modified.
#[derive(Clone, Debug)]
pub struct SkirmishGame {
    width: i32,
    height: i32,
    player_count: usize,
    tiles: Vector<Tile>,
    units: OrdMap<UnitId, Unit>,
    cities: OrdMap<Position, City>,
    pending: Vector<ScheduledAction>,
    clock_ms: u64,
    next_unit_id: u32,
    next_seq: u64,
    time_limit_ms: Option<u64>,
    /// Player whose knowledge the tiles' `known` flags describe.
    observer: Option<PlayerId>,
    sight: i32,
}

impl SkirmishGame {
    fn index(&self, pos: Position) -> Result<usize, MapError> {
        if self.is_inside(pos) {
            Ok((pos.y * self.width + pos.x) as usize)
        } else {
            Err(MapError::OutOfBounds(pos))
        }
    }

    fn tile(&self, pos: Position) -> Result<Tile, MapError> {
        let idx = self.index(pos)?;
        Ok(self.tiles[idx])
    }

    fn enemy_at(&self, pos: Position, player: PlayerId) -> bool {
        self.units
            .values()
            .any(|u| u.position == pos && u.owner != player)
            || self.cities.get(&pos).is_some_and(|c| c.owner != player)
    }

    fn reveal_around(&mut self, center: Position) {
        for dy in -self.sight..=self.sight {
            for dx in -self.sight..=self.sight {
                let pos = Position::new(center.x + dx, center.y + dy);
                if let Ok(idx) = self.index(pos) {
                    if !self.tiles[idx].known {
                        let mut tile = self.tiles[idx];
                        tile.known = true;
                        self.tiles.set(idx, tile);
                    }
                }
            }
        }
    }

    fn reveal_for_observer(&mut self) {
        let Some(observer) = self.observer else { return };
        let centres: Vec<Position> = self
            .units
            .values()
            .filter(|u| u.owner == observer)
            .map(|u| u.position)
            .chain(
                self.cities
                    .values()
                    .filter(|c| c.owner == observer)
                    .map(|c| c.position),
            )
            .collect();
        for centre in centres {
            self.reveal_around(centre);
        }
    }

    fn spawn_unit(&mut self, owner: PlayerId, unit_type: UnitTypeId, position: Position) -> UnitId {
        let hp = unit_type_spec(unit_type).map_or(1, |spec| spec.hp);
        let id = UnitId::new(self.next_unit_id);
        self.next_unit_id += 1;
        self.units.insert(id, Unit { id, owner, position, unit_type, hp });
        if self.observer == Some(owner) {
            self.reveal_around(position);
        }
        id
    }

    fn validity(&self, action: &PrimitiveAction, player: PlayerId) -> Result<(), &'static str> {
        match *action {
            PrimitiveAction::Move { unit, to } => {
                let unit = self.units.get(&unit).ok_or("unit does not exist")?;
                if unit.owner != player {
                    return Err("unit belongs to another player");
                }
                if !unit.position.is_orthogonally_adjacent(to) {
                    return Err("destination is not adjacent");
                }
                match self.is_movement_possible(to, player) {
                    Ok(true) => Ok(()),
                    Ok(false) => Err("destination is not occupiable"),
                    Err(_) => Err("destination is off the map"),
                }
            }
            PrimitiveAction::Attack { attacker, target } => {
                let attacker = self.units.get(&attacker).ok_or("attacker does not exist")?;
                let target = self.units.get(&target).ok_or("target does not exist")?;
                if attacker.owner != player {
                    return Err("attacker belongs to another player");
                }
                if target.owner == player {
                    return Err("target is friendly");
                }
                if attacker.position.chebyshev(target.position) > 1 {
                    return Err("target is out of range");
                }
                Ok(())
            }
            PrimitiveAction::Produce { city, unit_type } => {
                let city = self.cities.get(&city).ok_or("city does not exist")?;
                if city.owner != player {
                    return Err("city belongs to another player");
                }
                if unit_type_spec(unit_type).is_none() {
                    return Err("unknown unit type");
                }
                Ok(())
            }
        }
    }

    fn execute(&mut self, action: PrimitiveAction) {
        match action {
            PrimitiveAction::Move { unit, to } => {
                if let Some(mut moved) = self.units.get(&unit).copied() {
                    moved.position = to;
                    self.units.insert(unit, moved);
                    if self.observer == Some(moved.owner) {
                        self.reveal_around(to);
                    }
                }
            }
            PrimitiveAction::Attack { attacker, target } => {
                let damage = self
                    .units
                    .get(&attacker)
                    .and_then(|a| unit_type_spec(a.unit_type))
                    .map_or(0, |spec| spec.damage);
                if let Some(mut hit) = self.units.get(&target).copied() {
                    hit.hp = hit.hp.saturating_sub(damage);
                    if hit.hp == 0 {
                        self.units.remove(&target);
                    } else {
                        self.units.insert(target, hit);
                    }
                }
            }
            PrimitiveAction::Produce { city, unit_type } => {
                if let Some(mut producing) = self.cities.get(&city).copied() {
                    if producing.producing != Some(unit_type) {
                        producing.producing = Some(unit_type);
                        producing.progress_ms = 0;
                        self.cities.insert(city, producing);
                    }
                }
            }
        }
    }

    fn tick_production(&mut self, delta_ms: u64) {
        if delta_ms == 0 {
            return;
        }
        let mut spawns = Vec::new();
        let positions: Vec<Position> = self.cities.keys().copied().collect();
        for pos in positions {
            let Some(mut city) = self.cities.get(&pos).copied() else { continue };
            let Some(spec) = city.producing.and_then(unit_type_spec) else { continue };
            city.progress_ms += delta_ms;
            while city.progress_ms >= spec.production_ms {
                city.progress_ms -= spec.production_ms;
                spawns.push((city.owner, spec.id, city.position));
            }
            self.cities.insert(pos, city);
        }
        for (owner, unit_type, position) in spawns {
            self.spawn_unit(owner, unit_type, position);
        }
    }

    fn alive_players(&self) -> Vec<PlayerId> {
        PlayerId::all(self.player_count)
            .filter(|&p| {
                self.units.values().any(|u| u.owner == p)
                    || self.cities.values().any(|c| c.owner == p)
            })
            .collect()
    }

    // === Test and host helpers ===

    /// Number of scheduled actions not yet executed.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Terrain of a cell regardless of knowledge.
    pub fn terrain(&self, pos: Position) -> Result<Terrain, MapError> {
        Ok(self.tile(pos)?.terrain)
    }

    /// Overwrite terrain and knowledge of a cell.
    pub fn set_tile(&mut self, pos: Position, terrain: Terrain, known: bool) -> Result<(), MapError> {
        let idx = self.index(pos)?;
        self.tiles.set(idx, Tile { terrain, known });
        Ok(())
    }

    /// Remove a unit outright (destroyed or lost from sight).
    pub fn remove_unit(&mut self, id: UnitId) -> bool {
        self.units.remove(&id).is_some()
    }

    /// Place a new unit, returning its id.
    pub fn add_unit(&mut self, owner: PlayerId, unit_type: UnitTypeId, position: Position) -> UnitId {
        self.spawn_unit(owner, unit_type, position)
    }

    /// Read a city regardless of owner.
    #[must_use]
    pub fn city(&self, pos: Position) -> Option<CityView> {
        self.cities.get(&pos).map(|c| CityView {
            position: c.position,
            owner: c.owner,
            producing: c.producing,
        })
    }
}

impl Snapshot for SkirmishGame {
    fn copy(&self) -> Self {
        self.clone()
    }

    fn player_count(&self) -> usize {
        self.player_count
    }

    fn game_time_ms(&self) -> u64 {
        self.clock_ms
    }

    fn is_game_over(&self) -> bool {
        if self.time_limit_ms.is_some_and(|limit| self.clock_ms >= limit) {
            return true;
        }
        self.player_count > 1 && self.alive_players().len() <= 1
    }

    fn utility_values(&self) -> PlayerMap<f64> {
        let alive = self.alive_players();
        if alive.is_empty() {
            return PlayerMap::with_value(self.player_count, 0.0);
        }
        let share = 1.0 / alive.len() as f64;
        PlayerMap::new(self.player_count, |p| if alive.contains(&p) { share } else { 0.0 })
    }

    fn heuristic_values(&self) -> PlayerMap<f64> {
        let mut scores = PlayerMap::with_value(self.player_count, 0.0);
        for unit in self.units.values() {
            scores[unit.owner] += f64::from(unit.hp);
        }
        for city in self.cities.values() {
            scores[city.owner] += CITY_SCORE;
        }
        scores
    }

    fn is_valid_action(&self, action: &PrimitiveAction, player: PlayerId) -> bool {
        self.validity(action, player).is_ok()
    }

    fn schedule_action(&mut self, player: PlayerId, action: PrimitiveAction, at_ms: u64) {
        let at_ms = at_ms.max(self.clock_ms);
        let seq = self.next_seq;
        self.next_seq += 1;
        let idx = self
            .pending
            .iter()
            .position(|p| (p.at_ms, p.seq) > (at_ms, seq))
            .unwrap_or(self.pending.len());
        self.pending.insert(idx, ScheduledAction { at_ms, seq, player, action });
    }

    fn advance(&mut self, delta_ms: u64) -> Result<(), ActionFailed> {
        let target = self.clock_ms + delta_ms;
        let mut first_failure = None;

        while self.pending.front().is_some_and(|p| p.at_ms <= target) {
            let Some(next) = self.pending.pop_front() else { break };
            self.tick_production(next.at_ms.saturating_sub(self.clock_ms));
            self.clock_ms = self.clock_ms.max(next.at_ms);

            match self.validity(&next.action, next.player) {
                Ok(()) => self.execute(next.action),
                Err(reason) => {
                    if first_failure.is_none() {
                        first_failure = Some(ActionFailed::new(next.action, reason));
                    }
                }
            }
        }

        self.tick_production(target - self.clock_ms);
        self.clock_ms = target;

        match first_failure {
            Some(failure) => Err(failure),
            None => Ok(()),
        }
    }

    fn map_size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    fn is_known(&self, pos: Position) -> Result<bool, MapError> {
        Ok(self.tile(pos)?.known)
    }

    fn is_movement_possible(&self, pos: Position, player: PlayerId) -> Result<bool, MapError> {
        let tile = self.tile(pos)?;
        Ok(tile.known && tile.terrain.is_passable() && !self.enemy_at(pos, player))
    }

    fn unit(&self, id: UnitId) -> Option<UnitView> {
        let unit = self.units.get(&id)?;
        let visible = self.observer.map_or(true, |o| o == unit.owner)
            || self.tile(unit.position).is_ok_and(|t| t.known);
        visible.then(|| unit.view())
    }

    fn units_of(&self, player: PlayerId) -> Vec<UnitView> {
        let hidden = self.observer.is_some_and(|o| o != player);
        self.units
            .values()
            .filter(|u| u.owner == player)
            .filter(|u| !hidden || self.tile(u.position).is_ok_and(|t| t.known))
            .map(Unit::view)
            .collect()
    }

    fn visible_enemy_units(&self, player: PlayerId) -> Vec<UnitView> {
        self.units
            .values()
            .filter(|u| u.owner != player && self.tile(u.position).is_ok_and(|t| t.known))
            .map(Unit::view)
            .collect()
    }

    fn cities_of(&self, player: PlayerId) -> Vec<CityView> {
        self.cities
            .values()
            .filter(|c| c.owner == player)
            .map(|c| CityView {
                position: c.position,
                owner: c.owner,
                producing: c.producing,
            })
            .collect()
    }

    fn producible_types(&self, city: Position) -> Vec<UnitTypeId> {
        if self.cities.contains_key(&city) {
            UNIT_TYPES.iter().map(|spec| spec.id).collect()
        } else {
            Vec::new()
        }
    }

    fn determinize(&mut self, known: &FxHashSet<Position>) {
        // Most frequent terrain among known occupiable cells stands in for
        // every unknown cell.
        let mut counts: FxHashMap<Terrain, usize> = FxHashMap::default();
        for pos in known {
            if let Ok(tile) = self.tile(*pos) {
                *counts.entry(tile.terrain).or_default() += 1;
            }
        }
        let guess = [Terrain::Grass, Terrain::Forest, Terrain::Mountain, Terrain::Water]
            .into_iter()
            .max_by_key(|t| (counts.get(t).copied().unwrap_or(0), *t == Terrain::Grass))
            .unwrap_or(Terrain::Grass);

        // Units stay where they are: the reference game has no model of
        // where unseen units might be.
        for idx in 0..self.tiles.len() {
            if !self.tiles[idx].known {
                self.tiles.set(idx, Tile { terrain: guess, known: true });
            }
        }
    }
}

/// Builder for `SkirmishGame`.
///
/// ```
/// use rts_macro_mcts::core::{PlayerId, Position};
/// use rts_macro_mcts::engine::Snapshot;
/// use rts_macro_mcts::games::skirmish::{SkirmishBuilder, INFANTRY};
///
/// let game = SkirmishBuilder::new(5, 5)
///     .unit(PlayerId::new(0), INFANTRY, Position::new(0, 0))
///     .unit(PlayerId::new(1), INFANTRY, Position::new(4, 4))
///     .build();
/// assert_eq!(game.units_of(PlayerId::new(0)).len(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct SkirmishBuilder {
    width: i32,
    height: i32,
    player_count: usize,
    terrain: Vec<(Position, Terrain)>,
    unknown: Vec<Position>,
    units: Vec<(PlayerId, UnitTypeId, Position)>,
    cities: Vec<(PlayerId, Position, Option<UnitTypeId>)>,
    observer: Option<PlayerId>,
    sight: i32,
    time_limit_ms: Option<u64>,
}

impl SkirmishBuilder {
    /// A fully known grass map of the given size for two players.
    pub fn new(width: i32, height: i32) -> Self {
        assert!(width > 0 && height > 0, "map must be non-empty");
        Self {
            width,
            height,
            player_count: 2,
            terrain: Vec::new(),
            unknown: Vec::new(),
            units: Vec::new(),
            cities: Vec::new(),
            observer: None,
            sight: 1,
            time_limit_ms: None,
        }
    }

    pub fn players(mut self, count: usize) -> Self {
        assert!((1..=8).contains(&count), "Player count must be 1-8");
        self.player_count = count;
        self
    }

    /// Set the terrain of one cell.
    pub fn terrain(mut self, pos: Position, terrain: Terrain) -> Self {
        self.terrain.push((pos, terrain));
        self
    }

    /// Mark cells as impassable mountains.
    pub fn mountains(mut self, cells: impl IntoIterator<Item = Position>) -> Self {
        self.terrain
            .extend(cells.into_iter().map(|pos| (pos, Terrain::Mountain)));
        self
    }

    /// Hide a cell from the agent (no terrain data).
    pub fn unknown(mut self, pos: Position) -> Self {
        self.unknown.push(pos);
        self
    }

    /// Place a unit; ids are assigned from 1 in call order.
    pub fn unit(mut self, owner: PlayerId, unit_type: UnitTypeId, pos: Position) -> Self {
        self.units.push((owner, unit_type, pos));
        self
    }

    pub fn city(mut self, owner: PlayerId, pos: Position) -> Self {
        self.cities.push((owner, pos, None));
        self
    }

    /// Place a city already producing `unit_type`.
    pub fn city_producing(mut self, owner: PlayerId, pos: Position, unit_type: UnitTypeId) -> Self {
        self.cities.push((owner, pos, Some(unit_type)));
        self
    }

    /// Enable fog of war from `observer`'s point of view: only cells within
    /// `sight` (Chebyshev) of its units and cities start known.
    pub fn fog(mut self, observer: PlayerId, sight: i32) -> Self {
        self.observer = Some(observer);
        self.sight = sight.max(0);
        self
    }

    /// End the game once the clock reaches `ms`.
    pub fn time_limit(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    pub fn build(self) -> SkirmishGame {
        let fogged = self.observer.is_some();
        let len = (self.width * self.height) as usize;
        let tiles: Vector<Tile> = std::iter::repeat(Tile {
            terrain: Terrain::Grass,
            known: !fogged,
        })
        .take(len)
        .collect();

        let mut game = SkirmishGame {
            width: self.width,
            height: self.height,
            player_count: self.player_count,
            tiles,
            units: OrdMap::new(),
            cities: OrdMap::new(),
            pending: Vector::new(),
            clock_ms: 0,
            next_unit_id: 1,
            next_seq: 0,
            time_limit_ms: self.time_limit_ms,
            observer: self.observer,
            sight: self.sight,
        };

        for (pos, terrain) in self.terrain {
            if let Ok(idx) = game.index(pos) {
                let known = game.tiles[idx].known;
                game.tiles.set(idx, Tile { terrain, known });
            }
        }
        for (owner, pos, producing) in self.cities {
            game.cities.insert(pos, City { position: pos, owner, producing, progress_ms: 0 });
        }
        for (owner, unit_type, pos) in self.units {
            game.spawn_unit(owner, unit_type, pos);
        }
        game.reveal_for_observer();
        for pos in self.unknown {
            if let Ok(idx) = game.index(pos) {
                let terrain = game.tiles[idx].terrain;
                game.tiles.set(idx, Tile { terrain, known: false });
            }
        }
        game
    }
}
