//! Modelos de Analytics
//!
//! Este módulo contiene los modelos del panel de administración: el
//! resumen general y las métricas extendidas (ingresos por día,
//! ocupación, proyección mensual y ranking de spots).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Ingresos agrupados por método de pago
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentBreakdown {
    pub method: String,
    pub count: usize,
    pub amount: Decimal,
}

/// Resumen para el dashboard del admin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSummary {
    pub total_spots: usize,
    pub total_reservations: usize,
    pub total_revenue: Decimal,
    pub total_users: usize,
    pub status_distribution: BTreeMap<String, usize>,
    pub avg_booking: Decimal,
    pub payment_breakdown: Vec<PaymentBreakdown>,
    pub verification_rate: u32,
}

/// Ingresos completados de un día de la semana
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeekdayRevenue {
    pub day: String,
    pub total: Decimal,
}

/// Proyección de ingresos para lo que queda del mes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyProjection {
    pub projected_earnings: Decimal,
    pub days_remaining: u32,
}

/// Spot en el ranking de ingresos
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopSpot {
    pub spot_id: Uuid,
    pub name: String,
    pub total_revenue: Decimal,
}

/// Métricas completas del panel de admin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminMetrics {
    #[serde(flatten)]
    pub summary: AdminSummary,
    pub revenue_by_weekday: Vec<WeekdayRevenue>,
    pub occupancy_rate: f64,
    pub monthly_projection: MonthlyProjection,
    pub peak_day: String,
    pub top_spots: Vec<TopSpot>,
}
