//! Item, treasure, and quest-reward generation.
//!
//! Items are immutable once generated: their value is computed at
//! construction from rarity and attributes and never touched again. All
//! randomness flows through a caller-visible RNG so a seeded generator
//! produces reproducible loot.

use rand::distributions::WeightedIndex;
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// Rarity and item types
// ============================================================================

/// Item rarity tiers, ordered by increasing value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum Rarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub fn all() -> &'static [Rarity] {
        &[
            Rarity::Common,
            Rarity::Uncommon,
            Rarity::Rare,
            Rarity::Epic,
            Rarity::Legendary,
        ]
    }

    /// Ordinal position, used for probability weighting and attribute scaling.
    pub fn rank(&self) -> usize {
        *self as usize
    }

    /// Drop probability before re-normalization over the allowed subset.
    pub fn weight(&self) -> f64 {
        match self {
            Rarity::Common => 0.50,
            Rarity::Uncommon => 0.25,
            Rarity::Rare => 0.15,
            Rarity::Epic => 0.08,
            Rarity::Legendary => 0.02,
        }
    }

    /// Base credit value contributed by the tier alone.
    pub fn base_value(&self) -> i64 {
        match self {
            Rarity::Common => 100,
            Rarity::Uncommon => 200,
            Rarity::Rare => 500,
            Rarity::Epic => 1000,
            Rarity::Legendary => 2500,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Uncommon => "Uncommon",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Categories of generated items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemType {
    Weapon,
    Armor,
    Consumable,
    QuestItem,
}

impl ItemType {
    pub fn all() -> &'static [ItemType] {
        &[
            ItemType::Weapon,
            ItemType::Armor,
            ItemType::Consumable,
            ItemType::QuestItem,
        ]
    }

    /// Numeric attributes synthesized for this item type.
    pub fn attribute_keys(&self) -> &'static [&'static str] {
        match self {
            ItemType::Weapon => &["damage", "range", "speed"],
            ItemType::Armor => &["defense", "mobility", "shield"],
            ItemType::Consumable => &["healing", "buff_duration", "effect_power"],
            ItemType::QuestItem => &[],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ItemType::Weapon => "weapon",
            ItemType::Armor => "armor",
            ItemType::Consumable => "consumable",
            ItemType::QuestItem => "quest_item",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Fixed name pool for a type/rarity pair.
fn name_pool(item_type: ItemType, rarity: Rarity) -> &'static [&'static str] {
    match (item_type, rarity) {
        (ItemType::Weapon, Rarity::Common) => &["Rusty Blaster", "Basic Sword", "Standard Rifle"],
        (ItemType::Weapon, Rarity::Uncommon) => {
            &["Plasma Pistol", "Energy Blade", "Precision Rifle"]
        }
        (ItemType::Weapon, Rarity::Rare) => {
            &["Quantum Disruptor", "Phase Blade", "Particle Cannon"]
        }
        (ItemType::Weapon, Rarity::Epic) => &["Void Reaper", "Star Slicer", "Galaxy Driver"],
        (ItemType::Weapon, Rarity::Legendary) => {
            &["The Annihilator", "Cosmic Cleaver", "Nova Nemesis"]
        }
        (ItemType::Armor, Rarity::Common) => &["Basic Shield", "Light Armor", "Standard Helmet"],
        (ItemType::Armor, Rarity::Uncommon) => {
            &["Energy Shield", "Reinforced Suit", "Combat Helmet"]
        }
        (ItemType::Armor, Rarity::Rare) => &["Quantum Barrier", "Nano-weave Armor", "Neural Helm"],
        (ItemType::Armor, Rarity::Epic) => &["Void Shield", "Stellar Plate", "Cosmic Crown"],
        (ItemType::Armor, Rarity::Legendary) => {
            &["The Impenetrable", "Celestial Shell", "Crown of Eternity"]
        }
        (ItemType::Consumable, Rarity::Common) => &["Health Pack", "Energy Cell", "Repair Kit"],
        (ItemType::Consumable, Rarity::Uncommon) => {
            &["Advanced Medkit", "Shield Booster", "Quantum Cell"]
        }
        (ItemType::Consumable, Rarity::Rare) => {
            &["Regeneration Matrix", "Time Dilation Device", "Neural Enhancer"]
        }
        (ItemType::Consumable, Rarity::Epic) => {
            &["Phoenix Protocol", "Reality Anchor", "Mind Matrix"]
        }
        (ItemType::Consumable, Rarity::Legendary) => {
            &["Lazarus Protocol", "Time Loop Generator", "God Mode Matrix"]
        }
        (ItemType::QuestItem, Rarity::Common) => &["Data Pad", "Access Card", "Star Map Fragment"],
        (ItemType::QuestItem, Rarity::Uncommon) => {
            &["Encrypted Drive", "Security Clearance", "Ancient Tablet"]
        }
        (ItemType::QuestItem, Rarity::Rare) => &["AI Core", "Void Crystal", "Prophet's Scroll"],
        (ItemType::QuestItem, Rarity::Epic) => &["Reality Shard", "Dragon Heart", "Elder Scroll"],
        (ItemType::QuestItem, Rarity::Legendary) => {
            &["Universal Core", "Creation Seed", "Infinity Matrix"]
        }
    }
}

// ============================================================================
// Items
// ============================================================================

/// A generated item. Immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub item_type: ItemType,
    pub rarity: Rarity,
    /// Type-specific numeric stats, ordered for stable serialization.
    pub attributes: BTreeMap<String, i64>,
    /// Rarity base value plus the sum of attribute values. Computed once.
    pub value: i64,
}

impl Item {
    pub fn new(
        name: impl Into<String>,
        item_type: ItemType,
        rarity: Rarity,
        attributes: BTreeMap<String, i64>,
    ) -> Self {
        let value = rarity.base_value() + attributes.values().sum::<i64>();
        Self {
            name: name.into(),
            item_type,
            rarity,
            attributes,
            value,
        }
    }

    /// A named story item with no mechanical stats. Event rewards that name
    /// items (e.g. "Shield Upgrade") materialize as these.
    pub fn keepsake(name: impl Into<String>) -> Self {
        Self::new(name, ItemType::QuestItem, Rarity::Common, BTreeMap::new())
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.rarity)
    }
}

// ============================================================================
// Treasure
// ============================================================================

/// A point in 3-D space where a treasure sits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// A located container of items.
///
/// The `discovered` and `claimed` flags only ever transition false to true.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Treasure {
    pub name: String,
    pub description: String,
    pub contents: Vec<Item>,
    pub location: Location,
    discovered: bool,
    claimed: bool,
}

impl Treasure {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        contents: Vec<Item>,
        location: Location,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            contents,
            location,
            discovered: false,
            claimed: false,
        }
    }

    pub fn is_discovered(&self) -> bool {
        self.discovered
    }

    pub fn is_claimed(&self) -> bool {
        self.claimed
    }

    /// Mark the treasure as encountered.
    pub fn discover(&mut self) {
        self.discovered = true;
    }

    /// Mark the treasure as collected. Claiming implies discovery.
    pub fn claim(&mut self) {
        self.discovered = true;
        self.claimed = true;
    }

    /// Total credit value of the contents.
    pub fn total_value(&self) -> i64 {
        self.contents.iter().map(|i| i.value).sum()
    }
}

// ============================================================================
// Difficulty and quest rewards
// ============================================================================

/// Encounter difficulty, driving reward scale and minimum loot rarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
    Epic,
}

impl Difficulty {
    pub fn credit_multiplier(&self) -> i64 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Normal => 2,
            Difficulty::Hard => 3,
            Difficulty::Epic => 5,
        }
    }

    pub fn min_rarity(&self) -> Rarity {
        match self {
            Difficulty::Easy => Rarity::Common,
            Difficulty::Normal => Rarity::Uncommon,
            Difficulty::Hard => Rarity::Rare,
            Difficulty::Epic => Rarity::Epic,
        }
    }

    /// Inclusive item-count range for treasures of this difficulty.
    pub fn treasure_item_range(&self) -> (usize, usize) {
        match self {
            Difficulty::Easy => (1, 3),
            Difficulty::Normal => (2, 4),
            Difficulty::Hard => (3, 5),
            Difficulty::Epic => (4, 6),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
            Difficulty::Epic => "epic",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Rare bonus rewards attached to some quest payouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecialReward {
    MapFragment,
    RareBlueprint,
    FactionReputation,
    SpecialWeapon,
    UniqueAbility,
}

impl SpecialReward {
    pub fn all() -> &'static [SpecialReward] {
        &[
            SpecialReward::MapFragment,
            SpecialReward::RareBlueprint,
            SpecialReward::FactionReputation,
            SpecialReward::SpecialWeapon,
            SpecialReward::UniqueAbility,
        ]
    }
}

/// The payout of a completed quest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestReward {
    pub credits: i64,
    pub items: Vec<Item>,
    pub experience: i64,
    pub special_reward: Option<SpecialReward>,
}

// ============================================================================
// Generator
// ============================================================================

/// Randomized item/treasure factory.
///
/// Owns its RNG so callers can seed it for reproducible output.
#[derive(Debug)]
pub struct ItemGenerator {
    rng: StdRng,
}

impl ItemGenerator {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// A generator with a fixed seed. Identical seeds produce identical loot.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Pick a rarity at or above `min_rarity`, weighted by the fixed drop
    /// probabilities re-normalized over the allowed subset.
    fn roll_rarity(&mut self, min_rarity: Rarity) -> Rarity {
        let allowed = &Rarity::all()[min_rarity.rank()..];
        let weights: Vec<f64> = allowed.iter().map(|r| r.weight()).collect();
        // Weights are fixed positive constants, so the distribution is valid.
        let dist = WeightedIndex::new(&weights).expect("rarity weights are positive");
        allowed[dist.sample(&mut self.rng)]
    }

    /// Generate a random item of at least the given rarity.
    pub fn generate_item(&mut self, min_rarity: Rarity) -> Item {
        let rarity = self.roll_rarity(min_rarity);
        let item_type = *ItemType::all()
            .choose(&mut self.rng)
            .expect("item type list is non-empty");
        let name = *name_pool(item_type, rarity)
            .choose(&mut self.rng)
            .expect("name pool is non-empty");

        let scale = (rarity.rank() + 1) as i64;
        let attributes: BTreeMap<String, i64> = item_type
            .attribute_keys()
            .iter()
            .map(|key| (key.to_string(), self.rng.gen_range(1..=10) * scale))
            .collect();

        Item::new(name, item_type, rarity, attributes)
    }

    /// Generate a located treasure scaled to the difficulty.
    pub fn generate_treasure(&mut self, difficulty: Difficulty) -> Treasure {
        let (min_items, max_items) = difficulty.treasure_item_range();
        let count = self.rng.gen_range(min_items..=max_items);
        let contents: Vec<Item> = (0..count)
            .map(|_| self.generate_item(difficulty.min_rarity()))
            .collect();

        let adjectives = ["Ancient", "Hidden", "Secret", "Lost", "Forgotten"];
        let kinds = ["Cache", "Vault", "Stash", "Trove", "Hoard"];
        let name = format!(
            "{} {}",
            adjectives.choose(&mut self.rng).unwrap_or(&"Hidden"),
            kinds.choose(&mut self.rng).unwrap_or(&"Cache"),
        );
        let description = format!("A {difficulty} difficulty treasure containing {count} items.");

        let location = Location {
            x: self.rng.gen_range(-1000.0..=1000.0),
            y: self.rng.gen_range(-1000.0..=1000.0),
            z: self.rng.gen_range(-1000.0..=1000.0),
        };

        Treasure::new(name, description, contents, location)
    }

    /// Generate a quest payout: scaled credits and experience, one item at
    /// the difficulty's minimum rarity, and a 20% chance of a special reward.
    pub fn generate_quest_reward(&mut self, difficulty: Difficulty) -> QuestReward {
        let multiplier = difficulty.credit_multiplier();
        let credits = self.rng.gen_range(100..=500) * multiplier;
        let experience = self.rng.gen_range(50..=200) * multiplier;
        let items = vec![self.generate_item(difficulty.min_rarity())];

        let special_reward = if self.rng.gen_bool(0.2) {
            SpecialReward::all().choose(&mut self.rng).copied()
        } else {
            None
        };

        QuestReward {
            credits,
            items,
            experience,
            special_reward,
        }
    }
}

impl Default for ItemGenerator {
    fn default() -> Self {
        Self::new()
    }
}
