//! Agregados del panel de admin
//!
//! Todo se calcula con escaneos completos en cada llamada: no hay
//! contadores materializados que puedan desincronizarse.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{
    analytics::{AdminMetrics, AdminSummary, MonthlyProjection, PaymentBreakdown, TopSpot, WeekdayRevenue},
    reservation::{Reservation, ReservationStatus},
    spot::Spot,
};

const PROJECTION_WINDOW_DAYS: i64 = 14;
const TOP_SPOTS_LIMIT: usize = 5;

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn completed(reservations: &[Reservation]) -> impl Iterator<Item = &Reservation> {
    reservations
        .iter()
        .filter(|r| r.status == ReservationStatus::Completed)
}

/// Resumen general: totales, distribución y medios de pago
pub fn summary(spots: &[Spot], reservations: &[Reservation], total_users: usize) -> AdminSummary {
    let total_revenue: Decimal = reservations.iter().map(|r| r.amount).sum();
    let total_reservations = reservations.len();

    let avg_booking = if total_reservations > 0 {
        (total_revenue / Decimal::from(total_reservations)).round_dp(2)
    } else {
        Decimal::ZERO
    };

    let mut status_distribution: BTreeMap<String, usize> = ReservationStatus::ALL
        .iter()
        .map(|s| (s.as_str().to_string(), 0))
        .collect();
    for reservation in reservations {
        *status_distribution
            .entry(reservation.status.as_str().to_string())
            .or_insert(0) += 1;
    }

    let mut by_method: BTreeMap<String, (usize, Decimal)> = BTreeMap::new();
    for reservation in reservations {
        let entry = by_method
            .entry(reservation.payment_method.clone())
            .or_insert((0, Decimal::ZERO));
        entry.0 += 1;
        entry.1 += reservation.amount;
    }
    let payment_breakdown = by_method
        .into_iter()
        .map(|(method, (count, amount))| PaymentBreakdown { method, count, amount })
        .collect();

    let verification_rate = if spots.is_empty() {
        0
    } else {
        let verified = spots.iter().filter(|s| s.verified).count();
        (verified as f64 * 100.0 / spots.len() as f64).round() as u32
    };

    AdminSummary {
        total_spots: spots.len(),
        total_reservations,
        total_revenue,
        total_users,
        status_distribution,
        avg_booking,
        payment_breakdown,
        verification_rate,
    }
}

/// Ingresos completados por día de la semana (lunes primero)
pub fn revenue_by_weekday(reservations: &[Reservation]) -> Vec<WeekdayRevenue> {
    let mut totals: HashMap<Weekday, Decimal> = HashMap::new();
    for reservation in completed(reservations) {
        *totals.entry(reservation.date.weekday()).or_insert(Decimal::ZERO) += reservation.amount;
    }

    WEEK.iter()
        .filter_map(|day| {
            totals.get(day).map(|total| WeekdayRevenue {
                day: weekday_name(*day).to_string(),
                total: *total,
            })
        })
        .collect()
}

/// Porcentaje de spots con alguna reserva activa o pendiente
pub fn occupancy_rate(spots: &[Spot], reservations: &[Reservation]) -> f64 {
    if spots.is_empty() {
        return 0.0;
    }

    let occupied: HashSet<Uuid> = reservations
        .iter()
        .filter(|r| matches!(r.status, ReservationStatus::Active | ReservationStatus::Pending))
        .map(|r| r.spot_id)
        .collect();

    let rate = occupied.len() as f64 * 100.0 / spots.len() as f64;
    (rate * 100.0).round() / 100.0
}

fn last_day_of_month(today: NaiveDate) -> u32 {
    let (year, month) = if today.month() == 12 {
        (today.year() + 1, 1)
    } else {
        (today.year(), today.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}

/// Promedio diario de los últimos 14 días por los días que quedan del mes
pub fn monthly_projection(reservations: &[Reservation], today: NaiveDate) -> MonthlyProjection {
    let since = today - Duration::days(PROJECTION_WINDOW_DAYS);

    let mut per_day: HashMap<NaiveDate, Decimal> = HashMap::new();
    for reservation in completed(reservations).filter(|r| r.date >= since) {
        *per_day.entry(reservation.date).or_insert(Decimal::ZERO) += reservation.amount;
    }

    let daily_avg = if per_day.is_empty() {
        Decimal::ZERO
    } else {
        per_day.values().copied().sum::<Decimal>() / Decimal::from(per_day.len())
    };

    let days_remaining = last_day_of_month(today) - today.day();

    MonthlyProjection {
        projected_earnings: (daily_avg * Decimal::from(days_remaining)).round_dp(2),
        days_remaining,
    }
}

/// Día con más ingresos, "N/A" si no hay ninguno
pub fn peak_day(by_weekday: &[WeekdayRevenue]) -> String {
    by_weekday
        .iter()
        .fold(None::<&WeekdayRevenue>, |best, current| match best {
            Some(best) if best.total >= current.total => Some(best),
            _ => Some(current),
        })
        .map(|best| best.day.clone())
        .unwrap_or_else(|| "N/A".to_string())
}

/// Los 5 spots con más ingresos completados
pub fn top_spots(spots: &[Spot], reservations: &[Reservation]) -> Vec<TopSpot> {
    let names: HashMap<Uuid, &str> = spots.iter().map(|s| (s.id, s.name.as_str())).collect();

    let mut totals: HashMap<Uuid, (String, Decimal)> = HashMap::new();
    for reservation in completed(reservations) {
        let name = names
            .get(&reservation.spot_id)
            .copied()
            .unwrap_or(reservation.spot_name.as_str());
        let entry = totals
            .entry(reservation.spot_id)
            .or_insert_with(|| (name.to_string(), Decimal::ZERO));
        entry.1 += reservation.amount;
    }

    let mut ranking: Vec<TopSpot> = totals
        .into_iter()
        .map(|(spot_id, (name, total_revenue))| TopSpot { spot_id, name, total_revenue })
        .collect();
    ranking.sort_by(|a, b| b.total_revenue.cmp(&a.total_revenue).then_with(|| a.name.cmp(&b.name)));
    ranking.truncate(TOP_SPOTS_LIMIT);
    ranking
}

/// Resumen más las métricas extendidas
pub fn metrics(
    spots: &[Spot],
    reservations: &[Reservation],
    total_users: usize,
    today: NaiveDate,
) -> AdminMetrics {
    let revenue_by_weekday = revenue_by_weekday(reservations);
    let peak_day = peak_day(&revenue_by_weekday);

    AdminMetrics {
        summary: summary(spots, reservations, total_users),
        occupancy_rate: occupancy_rate(spots, reservations),
        monthly_projection: monthly_projection(reservations, today),
        top_spots: top_spots(spots, reservations),
        revenue_by_weekday,
        peak_day,
    }
}
