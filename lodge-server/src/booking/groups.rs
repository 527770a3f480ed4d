//! Group Combination Search
//!
//! Seats a party across two or more rooms at minimum total price.
//! Backtracking over room types sorted by descending adult capacity
//! (largest first prunes earlier), distributing the remaining party
//! evenly over each chosen quantity. Collection stops at 20 raw
//! combinations to bound the search on properties with many types;
//! results are priced and returned cheapest first.
//!
//! Single-room fits are the direct booking path's job: a combination is
//! only accepted when it uses at least two rooms.

use shared::StayRange;
use shared::models::RoomType;
use sqlx::SqlitePool;

use crate::booking::availability;
use crate::core::error::EngineResult;
use crate::db::repository::room_type;
use crate::pricing::{self, NightlyPrice, PricingProvider};
use crate::utils::money;
use crate::utils::validation::validate_stay_range;

/// Pruning bound on raw (unpriced) combinations.
const MAX_RAW_COMBINATIONS: usize = 20;

/// Default number of priced combinations returned.
pub const DEFAULT_MAX_RESULTS: usize = 3;

/// Search input: one room type with its free capacity for the window.
#[derive(Debug, Clone)]
pub struct RoomTypeInventory {
    pub room_type: RoomType,
    pub available_rooms: i64,
}

/// One line of a combination: `quantity` rooms of a type with the party
/// share each room takes.
#[derive(Debug, Clone)]
pub struct ComboLine {
    pub room_type_id: i64,
    pub room_type_name: String,
    pub quantity: i32,
    pub adults_per_room: i32,
    pub children_per_room: i32,
    pub nightly_prices: Vec<NightlyPrice>,
    pub subtotal: f64,
}

/// A priced multi-room combination
#[derive(Debug, Clone)]
pub struct GroupCombination {
    pub rooms: Vec<ComboLine>,
    pub total: f64,
}

#[derive(Clone)]
struct Selection {
    type_idx: usize,
    quantity: i32,
    adults_per_room: i32,
    children_per_room: i32,
}

/// Find up to `max_results` combinations seating the whole party,
/// cheapest first. Ties keep search-discovery order (stable sort).
pub fn find_group_combinations(
    inventory: &[RoomTypeInventory],
    total_adults: i32,
    total_children: i32,
    range: &StayRange,
    pricing_provider: &dyn PricingProvider,
    max_results: usize,
) -> Vec<GroupCombination> {
    // A lone guest never needs the multi-room path.
    if total_adults <= 1 && total_children <= 0 {
        return Vec::new();
    }

    // Largest types first for earlier pruning; stable sort keeps the
    // caller's order among equal capacities.
    let mut sorted: Vec<&RoomTypeInventory> = inventory.iter().collect();
    sorted.sort_by(|a, b| b.room_type.max_adults.cmp(&a.room_type.max_adults));

    let mut raw: Vec<Vec<Selection>> = Vec::new();
    let mut current: Vec<Selection> = Vec::new();
    backtrack(
        &sorted,
        total_adults,
        total_children,
        0,
        &mut current,
        &mut raw,
    );

    let mut priced: Vec<GroupCombination> = raw
        .into_iter()
        .map(|combo| price_combination(&sorted, combo, range, pricing_provider))
        .collect();
    priced.sort_by(|a, b| a.total.partial_cmp(&b.total).unwrap_or(std::cmp::Ordering::Equal));
    priced.truncate(max_results);
    priced
}

/// Availability-driven entry point for parties that cannot fit one
/// room: gather every active type's free count for the window (the
/// search distributes the party, so no per-room capacity filter here)
/// and hand it to the combination search.
pub async fn search_group_options(
    pool: &SqlitePool,
    property_id: i64,
    range: &StayRange,
    total_adults: i32,
    total_children: i32,
    pricing_provider: &dyn PricingProvider,
    max_results: usize,
) -> EngineResult<Vec<GroupCombination>> {
    validate_stay_range(range)?;

    let types = room_type::find_active_for_property(pool, property_id).await?;
    let mut conn = pool.acquire().await?;
    let mut inventory = Vec::new();
    for rt in types {
        let free = availability::available(&mut conn, property_id, rt.id, range).await?;
        if free > 0 {
            inventory.push(RoomTypeInventory {
                room_type: rt,
                available_rooms: free,
            });
        }
    }

    Ok(find_group_combinations(
        &inventory,
        total_adults,
        total_children,
        range,
        pricing_provider,
        max_results,
    ))
}

fn backtrack(
    types: &[&RoomTypeInventory],
    remaining_adults: i32,
    remaining_children: i32,
    idx: usize,
    current: &mut Vec<Selection>,
    results: &mut Vec<Vec<Selection>>,
) {
    if remaining_adults <= 0 && remaining_children <= 0 {
        // Only combinations of 2+ rooms; one-room fits belong to the
        // direct path.
        let total_rooms: i32 = current.iter().map(|s| s.quantity).sum();
        if total_rooms >= 2 {
            results.push(current.clone());
        }
        return;
    }

    if results.len() >= MAX_RAW_COMBINATIONS {
        return;
    }
    let Some(inv) = types.get(idx) else {
        return;
    };

    let max_adults_per = inv.room_type.max_adults;
    if max_adults_per <= 0 {
        // A type that seats no adults cannot contribute.
        backtrack(types, remaining_adults, remaining_children, idx + 1, current, results);
        return;
    }

    let max_needed = div_ceil(remaining_adults.max(1), max_adults_per);
    let max_qty = (inv.available_rooms as i32).min(max_needed);

    for qty in (1..=max_qty).rev() {
        let adults_per = if remaining_adults > 0 {
            div_ceil(remaining_adults, qty).min(max_adults_per)
        } else {
            0
        };
        let children_per = if remaining_children > 0 {
            div_ceil(remaining_children, qty)
        } else {
            0
        };

        current.push(Selection {
            type_idx: idx,
            quantity: qty,
            adults_per_room: adults_per,
            children_per_room: children_per,
        });
        backtrack(
            types,
            remaining_adults - adults_per * qty,
            remaining_children - children_per * qty,
            idx + 1,
            current,
            results,
        );
        current.pop();
    }

    // Also try skipping this type entirely.
    backtrack(types, remaining_adults, remaining_children, idx + 1, current, results);
}

fn price_combination(
    types: &[&RoomTypeInventory],
    combo: Vec<Selection>,
    range: &StayRange,
    pricing_provider: &dyn PricingProvider,
) -> GroupCombination {
    let mut rooms = Vec::with_capacity(combo.len());
    let mut total = money::to_decimal(0.0);

    for sel in combo {
        let rt = &types[sel.type_idx].room_type;
        let nightly = pricing_provider.nightly_prices(
            rt,
            range,
            sel.adults_per_room,
            sel.children_per_room,
            None,
        );
        let subtotal = money::to_f64(
            money::to_decimal(pricing::total(&nightly))
                * rust_decimal::Decimal::from(sel.quantity),
        );
        total += money::to_decimal(subtotal);

        rooms.push(ComboLine {
            room_type_id: rt.id,
            room_type_name: rt.name.clone(),
            quantity: sel.quantity,
            adults_per_room: sel.adults_per_room,
            children_per_room: sel.children_per_room,
            nightly_prices: nightly,
            subtotal,
        });
    }

    GroupCombination {
        rooms,
        total: money::to_f64(total),
    }
}

fn div_ceil(a: i32, b: i32) -> i32 {
    (a + b - 1) / b
}
