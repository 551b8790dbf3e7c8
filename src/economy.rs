//! Shop economy: finished weapons, customers, reputation, and upgrades.
//!
//! ## Pricing
//!
//! ```text
//! price = base_price(type) · quality_multiplier(quality) · reputation_multiplier(reputation)
//! ```
//!
//! Both multipliers interpolate linearly over `[0, 100]`.  The price is fixed
//! when the weapon is created; later reputation changes do not re-price stock.
//!
//! ## Customers
//!
//! A customer arrives every `customer_spawn_interval` seconds while fewer than
//! `max_customers` are waiting.  Patience ticks down every frame; at zero the
//! customer leaves and reputation drops by `patience_reputation_penalty`.
//! That is the only failure path of the shop loop.
//!
//! ## Sales
//!
//! A sale needs an exact type match and `quality ≥ min_quality`.  A refused
//! offer costs `rejection_reputation_penalty` but never touches money or
//! inventory.

use crate::config::ForgeConfig;
use crate::error::SaleRejection;
use crate::events::{DepartureReason, ForgeEvent};
use crate::input::{InputKey, InputState};
use crate::persistence::SaveRequest;
use crate::simulation::{ForgeRng, SimClock};
use crate::stations::BilletQuenched;
use bevy::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Unlock key of the master hammer upgrade.
pub const MASTER_HAMMER_UNLOCK: &str = "master_hammer";

// ── Weapons ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponType {
    Dagger,
    Sword,
    Axe,
    Mace,
}

impl WeaponType {
    pub const ALL: [WeaponType; 4] = [
        WeaponType::Dagger,
        WeaponType::Sword,
        WeaponType::Axe,
        WeaponType::Mace,
    ];

    pub fn label(self) -> &'static str {
        match self {
            WeaponType::Dagger => "Dagger",
            WeaponType::Sword => "Sword",
            WeaponType::Axe => "Axe",
            WeaponType::Mace => "Mace",
        }
    }

    /// Next type in the design cycle.
    pub fn next(self) -> Self {
        match self {
            WeaponType::Dagger => WeaponType::Sword,
            WeaponType::Sword => WeaponType::Axe,
            WeaponType::Axe => WeaponType::Mace,
            WeaponType::Mace => WeaponType::Dagger,
        }
    }

    pub fn base_price(self, config: &ForgeConfig) -> f32 {
        match self {
            WeaponType::Dagger => config.dagger_base_price,
            WeaponType::Sword => config.sword_base_price,
            WeaponType::Axe => config.axe_base_price,
            WeaponType::Mace => config.mace_base_price,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WeaponId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CustomerId(pub u32);

/// A finished weapon.  Immutable once created; removed on sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weapon {
    pub id: WeaponId,
    pub kind: WeaponType,
    pub quality: f32,
    pub strike_count: u32,
    pub price: u32,
    /// Simulation seconds at creation.
    pub forged_at: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub wants: WeaponType,
    pub min_quality: f32,
    /// Seconds left before the customer walks out.
    pub patience: f32,
}

/// Result of a successful sale.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleReceipt {
    pub weapon: Weapon,
    pub customer: Customer,
    pub price: u32,
}

/// Outcome of an upgrade purchase attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradePurchase {
    Purchased { cost: u32 },
    AlreadyOwned,
    InsufficientFunds { cost: u32 },
}

// ── Pricing ───────────────────────────────────────────────────────────────────

#[inline]
fn lerp_percent(min: f32, max: f32, value: f32) -> f32 {
    min + (max - min) * (value / 100.0).clamp(0.0, 1.0)
}

/// Quality `[0, 100]` → price factor, 0.5 to 2.0 by default.
pub fn quality_multiplier(quality: f32, config: &ForgeConfig) -> f32 {
    lerp_percent(config.quality_mult_min, config.quality_mult_max, quality)
}

/// Reputation `[0, 100]` → price factor, 0.75 to 1.5 by default.
pub fn reputation_multiplier(reputation: f32, config: &ForgeConfig) -> f32 {
    lerp_percent(config.reputation_mult_min, config.reputation_mult_max, reputation)
}

pub fn price_for(kind: WeaponType, quality: f32, reputation: f32, config: &ForgeConfig) -> u32 {
    let price = kind.base_price(config)
        * quality_multiplier(quality, config)
        * reputation_multiplier(reputation, config);
    price.round().max(0.0) as u32
}

// ── Ledger ────────────────────────────────────────────────────────────────────

/// Money, stock, customers, reputation, and unlocks.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct Ledger {
    pub money: u32,
    pub reputation: f32,
    pub inventory: Vec<Weapon>,
    pub customers: Vec<Customer>,
    pub unlocks: BTreeSet<String>,
    pub next_weapon_id: u32,
    pub next_customer_id: u32,
    /// Seconds since the last customer spawn attempt.
    pub spawn_timer: f32,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(&ForgeConfig::default())
    }
}

impl Ledger {
    pub fn new(config: &ForgeConfig) -> Self {
        Self {
            money: config.starting_money,
            reputation: config.starting_reputation,
            inventory: Vec::new(),
            customers: Vec::new(),
            unlocks: BTreeSet::new(),
            next_weapon_id: 0,
            next_customer_id: 0,
            spawn_timer: 0.0,
        }
    }

    fn adjust_reputation(&mut self, delta: f32, config: &ForgeConfig) {
        self.reputation = (self.reputation + delta).clamp(0.0, config.max_reputation);
    }

    /// Snapshot a finished billet into an immutable, priced weapon record.
    pub fn create_weapon(
        &mut self,
        kind: WeaponType,
        quality: f32,
        strike_count: u32,
        forged_at: f64,
        config: &ForgeConfig,
    ) -> Weapon {
        let quality = quality.clamp(0.0, 100.0);
        let weapon = Weapon {
            id: WeaponId(self.next_weapon_id),
            kind,
            quality,
            strike_count,
            price: price_for(kind, quality, self.reputation, config),
            forged_at,
        };
        self.next_weapon_id += 1;
        self.inventory.push(weapon.clone());
        weapon
    }

    /// Add a random customer unless the shop is full.
    pub fn spawn_customer<R: Rng>(
        &mut self,
        rng: &mut R,
        config: &ForgeConfig,
    ) -> Option<Customer> {
        if self.customers.len() >= config.max_customers {
            return None;
        }
        let name = crate::constants::CUSTOMER_NAMES
            .choose(rng)
            .copied()
            .unwrap_or("Stranger")
            .to_string();
        let wants = WeaponType::ALL.choose(rng).copied().unwrap_or(WeaponType::Sword);
        let (lo, hi) = config.customer_min_quality_range;
        let steps = (hi - lo) / 5;
        let min_quality = (lo + rng.gen_range(0..=steps) * 5) as f32;
        let (p_lo, p_hi) = config.customer_patience_range;
        let patience = if p_hi > p_lo { rng.gen_range(p_lo..=p_hi) } else { p_lo };

        let customer = Customer {
            id: CustomerId(self.next_customer_id),
            name,
            wants,
            min_quality,
            patience,
        };
        self.next_customer_id += 1;
        self.customers.push(customer.clone());
        Some(customer)
    }

    /// Advance the spawn timer; spawns at most one customer per interval.
    pub fn tick_spawner<R: Rng>(
        &mut self,
        dt: f32,
        rng: &mut R,
        config: &ForgeConfig,
    ) -> Option<Customer> {
        self.spawn_timer += dt;
        if self.spawn_timer < config.customer_spawn_interval {
            return None;
        }
        self.spawn_timer -= config.customer_spawn_interval;
        self.spawn_customer(rng, config)
    }

    /// Count patience down.  Customers reaching zero leave, each costing the
    /// fixed reputation penalty.
    pub fn tick_patience(&mut self, dt: f32, config: &ForgeConfig) -> Vec<Customer> {
        let mut departed = Vec::new();
        for customer in &mut self.customers {
            customer.patience -= dt;
        }
        self.customers.retain(|customer| {
            if customer.patience <= 0.0 {
                departed.push(customer.clone());
                false
            } else {
                true
            }
        });
        for _ in &departed {
            self.adjust_reputation(-config.patience_reputation_penalty, config);
        }
        departed
    }

    pub fn customer_in_slot(&self, slot: usize) -> Option<&Customer> {
        self.customers.get(slot)
    }

    pub fn customer(&self, id: CustomerId) -> Option<&Customer> {
        self.customers.iter().find(|c| c.id == id)
    }

    pub fn weapon(&self, id: WeaponId) -> Option<&Weapon> {
        self.inventory.iter().find(|w| w.id == id)
    }

    /// Weapon to offer a customer: the best one of the wanted type, or the
    /// newest one if none match.
    pub fn best_offer_for(&self, customer: &Customer) -> Option<WeaponId> {
        self.inventory
            .iter()
            .filter(|w| w.kind == customer.wants)
            .max_by(|a, b| a.quality.total_cmp(&b.quality))
            .or_else(|| self.inventory.last())
            .map(|w| w.id)
    }

    /// Offer `weapon` to `customer`.
    pub fn sell_weapon(
        &mut self,
        weapon: WeaponId,
        customer: CustomerId,
        config: &ForgeConfig,
    ) -> Result<SaleReceipt, SaleRejection> {
        let customer_index = self
            .customers
            .iter()
            .position(|c| c.id == customer)
            .ok_or(SaleRejection::UnknownCustomer)?;
        let weapon_index = self
            .inventory
            .iter()
            .position(|w| w.id == weapon)
            .ok_or(SaleRejection::UnknownWeapon)?;

        let wanted = &self.customers[customer_index];
        let offered = &self.inventory[weapon_index];
        let refusal = if offered.kind != wanted.wants {
            Some(SaleRejection::TypeMismatch {
                wanted: wanted.wants,
                offered: offered.kind,
            })
        } else if offered.quality < wanted.min_quality {
            Some(SaleRejection::InsufficientQuality {
                required: wanted.min_quality,
                offered: offered.quality,
            })
        } else {
            None
        };
        if let Some(rejection) = refusal {
            self.adjust_reputation(-config.rejection_reputation_penalty, config);
            return Err(rejection);
        }

        let weapon = self.inventory.remove(weapon_index);
        let customer = self.customers.remove(customer_index);
        let price = weapon.price;
        self.money = self.money.saturating_add(price);
        self.adjust_reputation(config.sale_reputation_gain, config);
        Ok(SaleReceipt {
            weapon,
            customer,
            price,
        })
    }

    pub fn is_unlocked(&self, key: &str) -> bool {
        self.unlocks.contains(key)
    }

    /// Spend money on a one-time unlock.
    pub fn purchase_unlock(&mut self, key: &str, cost: u32) -> UpgradePurchase {
        if self.is_unlocked(key) {
            return UpgradePurchase::AlreadyOwned;
        }
        if self.money < cost {
            return UpgradePurchase::InsufficientFunds { cost };
        }
        self.money -= cost;
        self.unlocks.insert(key.to_string());
        UpgradePurchase::Purchased { cost }
    }
}

// ── System ────────────────────────────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
pub fn economy_system(
    clock: Res<SimClock>,
    config: Res<ForgeConfig>,
    input: Res<InputState>,
    mut rng: ResMut<ForgeRng>,
    mut ledger: ResMut<Ledger>,
    mut quenched: MessageReader<BilletQuenched>,
    mut events: MessageWriter<ForgeEvent>,
    mut saves: MessageWriter<SaveRequest>,
) {
    for billet in quenched.read() {
        let weapon = ledger.create_weapon(
            billet.kind,
            billet.grade,
            billet.strike_count,
            clock.elapsed,
            &config,
        );
        info!(
            "Forged {} #{} (quality {:.0}, {} strikes) worth {}",
            weapon.kind.label(),
            weapon.id.0,
            weapon.quality,
            weapon.strike_count,
            weapon.price
        );
        events.write(ForgeEvent::feedback(format!(
            "Forged a {} of quality {:.0}, worth {} coins",
            weapon.kind.label(),
            weapon.quality,
            weapon.price
        )));
        events.write(ForgeEvent::WeaponForged {
            id: weapon.id,
            kind: weapon.kind,
            quality: weapon.quality,
            price: weapon.price,
        });
        saves.write(SaveRequest);
    }

    if let Some(customer) = ledger.tick_spawner(clock.dt, &mut rng.0, &config) {
        info!(
            "{} wants a {} of quality {:.0}+ ({:.0}s patience)",
            customer.name,
            customer.wants.label(),
            customer.min_quality,
            customer.patience
        );
        events.write(ForgeEvent::CustomerArrived {
            id: customer.id,
            name: customer.name,
            wants: customer.wants,
            min_quality: customer.min_quality,
        });
    }

    for customer in ledger.tick_patience(clock.dt, &config) {
        info!("{} lost patience and left", customer.name);
        events.write(ForgeEvent::feedback(format!(
            "{} left without buying",
            customer.name
        )));
        events.write(ForgeEvent::CustomerDeparted {
            id: customer.id,
            reason: DepartureReason::LostPatience,
        });
    }

    // Slots refer to the queue as it stood when the keys went down; a sale
    // shifts the queue, so every slot is pinned to a customer first.
    let slots: BTreeSet<u8> = input
        .just_pressed_keys()
        .filter_map(|key| match key {
            InputKey::Sell(slot) => Some(*slot),
            _ => None,
        })
        .collect();
    let buyers: Vec<Option<CustomerId>> = slots
        .iter()
        .map(|&slot| ledger.customer_in_slot(slot as usize).map(|c| c.id))
        .collect();
    for buyer in buyers {
        let Some(customer) = buyer.and_then(|id| ledger.customer(id)).cloned() else {
            events.write(ForgeEvent::feedback(SaleRejection::UnknownCustomer.message()));
            continue;
        };
        let Some(offer) = ledger.best_offer_for(&customer) else {
            events.write(ForgeEvent::feedback(SaleRejection::UnknownWeapon.message()));
            continue;
        };
        match ledger.sell_weapon(offer, customer.id, &config) {
            Ok(receipt) => {
                info!(
                    "Sold {} to {} for {}",
                    receipt.weapon.kind.label(),
                    receipt.customer.name,
                    receipt.price
                );
                events.write(ForgeEvent::SaleCompleted {
                    price: receipt.price,
                });
                events.write(ForgeEvent::CustomerDeparted {
                    id: receipt.customer.id,
                    reason: DepartureReason::Served,
                });
                events.write(ForgeEvent::feedback(format!(
                    "{} paid {} coins",
                    receipt.customer.name, receipt.price
                )));
                saves.write(SaveRequest);
            }
            Err(rejection) => {
                debug!("Sale refused: {:?}", rejection);
                events.write(ForgeEvent::feedback(rejection.message()));
            }
        }
    }
}
