//! Filtrado y orden del catálogo de spots
//!
//! Los filtros son conjuntivos. Un flag booleano en `true` exige la
//! característica; en `false` o ausente no filtra.

use std::cmp::Ordering;

use crate::dto::spot_dto::{SpotFilters, SpotSort};
use crate::models::spot::Spot;

fn flag(wanted: Option<bool>, value: bool) -> bool {
    !wanted.unwrap_or(false) || value
}

fn matches(spot: &Spot, filters: &SpotFilters, term: Option<&str>, zone: Option<&str>) -> bool {
    if let Some(term) = term {
        let hit = [&spot.name, &spot.address, &spot.zone]
            .iter()
            .any(|field| field.to_lowercase().contains(term));
        if !hit {
            return false;
        }
    }

    if let Some(zone) = zone {
        if spot.zone.to_lowercase() != zone {
            return false;
        }
    }

    if let Some(max_price) = filters.max_price {
        if spot.hourly_price > max_price {
            return false;
        }
    }

    flag(filters.verified, spot.verified)
        && flag(filters.available, spot.available())
        && flag(filters.is_24h, spot.is_24h)
        && flag(filters.ev_charging, spot.ev_charging)
        && flag(filters.has_security, spot.has_security)
        && flag(filters.is_illuminated, spot.is_illuminated)
}

fn normalized(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
}

/// Aplicar filtros y orden a la lista de spots publicados
pub fn search(spots: Vec<Spot>, filters: &SpotFilters) -> Vec<Spot> {
    let term = normalized(&filters.q);
    let zone = normalized(&filters.zone);

    let mut result: Vec<Spot> = spots
        .into_iter()
        .filter(|spot| matches(spot, filters, term.as_deref(), zone.as_deref()))
        .collect();

    match filters.sort.unwrap_or_default() {
        SpotSort::Name => result.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase())),
        SpotSort::Price => result.sort_by(|a, b| a.hourly_price.cmp(&b.hourly_price)),
        SpotSort::Rating => result.sort_by(|a, b| {
            b.rating.partial_cmp(&a.rating).unwrap_or(Ordering::Equal)
        }),
    }

    result
}
