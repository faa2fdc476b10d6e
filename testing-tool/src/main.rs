//! Herramienta interactiva para probar una instancia de PARKLY
//!
//! Hace login contra el servidor y permite buscar spots, cotizar una
//! franja horaria y revisar las reservas del usuario.

use anyhow::{anyhow, Context, Result};
use colored::*;
use reqwest::Client;
use serde_json::{json, Value};
use std::io::{self, Write};

struct Session {
    client: Client,
    base_url: String,
    token: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    println!("{}", "🅿️ PARKLY Testing Tool".bright_blue().bold());
    println!("{}", "=====================================".bright_blue());
    println!();

    let base_url = prompt_with_default("URL del servidor", "http://localhost:3000")?;
    let client = Client::new();

    check_health(&client, &base_url).await?;

    let email = prompt("Email: ")?;
    let password = prompt("Password: ")?;
    let session = login(client, base_url, &email, &password).await?;

    loop {
        println!();
        println!("{}", "📋 MENÚ PRINCIPAL".bright_green().bold());
        println!("{}", "==================".bright_green());
        println!("1. 🔍 Buscar spots");
        println!("2. 💰 Cotizar una reserva");
        println!("3. 📅 Ver mis reservas");
        println!("4. 🚪 Salir");

        let choice = prompt("Selecciona una opción (1-4): ")?;
        let result = match choice.as_str() {
            "1" => search_spots(&session).await,
            "2" => quote(&session).await,
            "3" => my_reservations(&session).await,
            "4" => {
                println!("{}", "👋 ¡Hasta luego!".bright_green());
                break;
            }
            _ => {
                println!("{}", "❌ Opción inválida. Intenta de nuevo.".bright_red());
                continue;
            }
        };

        if let Err(e) = result {
            println!("{} {}", "❌ Error:".bright_red().bold(), e);
        }
    }

    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label.bright_yellow());
    io::stdout().flush()?;
    let mut value = String::new();
    io::stdin().read_line(&mut value)?;
    Ok(value.trim().to_string())
}

fn prompt_with_default(label: &str, default: &str) -> Result<String> {
    let value = prompt(&format!("{} [{}]: ", label, default))?;
    Ok(if value.is_empty() { default.to_string() } else { value })
}

async fn check_health(client: &Client, base_url: &str) -> Result<()> {
    let body: Value = client
        .get(format!("{}/health", base_url))
        .send()
        .await
        .context("No se pudo contactar el servidor")?
        .json()
        .await?;

    println!(
        "{} storage={} redis={}",
        "✅ Servidor arriba:".bright_green(),
        body["storage"],
        body["redis"]
    );
    Ok(())
}

async fn login(client: Client, base_url: String, email: &str, password: &str) -> Result<Session> {
    println!();
    println!("{}", "🔐 AUTENTICANDO...".bright_cyan().bold());

    let response = client
        .post(format!("{}/api/login", base_url))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await?;

    let status = response.status();
    let body: Value = response.json().await?;
    if !status.is_success() {
        return Err(anyhow!("Login falló ({}): {}", status, body["message"]));
    }

    let token = body["token"]
        .as_str()
        .ok_or_else(|| anyhow!("Respuesta de login sin token"))?
        .to_string();

    println!(
        "{} {} ({})",
        "✅ Sesión iniciada:".bright_green(),
        body["user"]["name"],
        body["user"]["role"]
    );

    Ok(Session { client, base_url, token })
}

/// GET autenticado que devuelve el campo `data`
async fn get_data(session: &Session, path: &str, query: &[(&str, String)]) -> Result<Value> {
    let response = session
        .client
        .get(format!("{}{}", session.base_url, path))
        .bearer_auth(&session.token)
        .query(query)
        .send()
        .await?;

    let status = response.status();
    let body: Value = response.json().await?;
    if !status.is_success() {
        return Err(anyhow!("{} ({}): {}", path, status, body["message"]));
    }
    Ok(body["data"].clone())
}

async fn search_spots(session: &Session) -> Result<()> {
    let q = prompt("Texto a buscar (vacío = todos): ")?;
    let zone = prompt("Zona (vacío = todas): ")?;
    let sort = prompt_with_default("Orden (name/price/rating)", "name")?;

    let mut query = vec![("sort", sort)];
    if !q.is_empty() {
        query.push(("q", q));
    }
    if !zone.is_empty() {
        query.push(("zone", zone));
    }

    let spots = get_data(session, "/api/spots", &query).await?;
    let spots = spots.as_array().cloned().unwrap_or_default();

    println!();
    println!("{} {}", "🅿️ Spots encontrados:".bright_green().bold(), spots.len());
    for spot in spots {
        println!(
            "  {} {} | {} | ${}/h | libres {} | ⭐ {}",
            spot["id"].as_str().unwrap_or("-").dimmed(),
            spot["name"].as_str().unwrap_or("-").bold(),
            spot["zone"].as_str().unwrap_or("-"),
            spot["hourly_price"],
            spot["free_spots"],
            spot["rating"]
        );
    }
    Ok(())
}

async fn quote(session: &Session) -> Result<()> {
    let spot_id = prompt("Id del spot: ")?;
    let date = prompt("Fecha (YYYY-MM-DD): ")?;
    let start_time = prompt_with_default("Hora de entrada", "09:00")?;
    let end_time = prompt_with_default("Hora de salida", "11:00")?;

    let response = session
        .client
        .post(format!("{}/api/reservations/quote", session.base_url))
        .bearer_auth(&session.token)
        .json(&json!({
            "spot_id": spot_id,
            "date": date,
            "start_time": start_time,
            "end_time": end_time,
        }))
        .send()
        .await?;

    let status = response.status();
    let body: Value = response.json().await?;
    if !status.is_success() {
        return Err(anyhow!("Cotización rechazada ({}): {}", status, body["message"]));
    }

    let quote = &body["data"];
    println!();
    println!("{}", "💰 COTIZACIÓN".bright_green().bold());
    println!("  Spot:        {}", quote["spot_name"]);
    println!("  Horas:       {} (cobradas {})", quote["hours"], quote["billed_hours"]);
    println!("  Subtotal:    {}", quote["subtotal"]);
    println!("  Tarifa:      {}", quote["fee"]);
    println!("  {}       {}", "Total:".bold(), quote["total"]);
    println!("  Referencia:  {}", quote["reference"]);
    Ok(())
}

async fn my_reservations(session: &Session) -> Result<()> {
    let reservations = get_data(session, "/api/reservations", &[]).await?;
    let reservations = reservations.as_array().cloned().unwrap_or_default();

    println!();
    println!("{} {}", "📅 Reservas:".bright_green().bold(), reservations.len());
    for r in reservations {
        println!(
            "  {} | {} | {} {}-{} | {} | {}",
            r["reference"].as_str().unwrap_or("-").bold(),
            r["spot_name"].as_str().unwrap_or("-"),
            r["date"].as_str().unwrap_or("-"),
            r["start_time"].as_str().unwrap_or("-"),
            r["end_time"].as_str().unwrap_or("-"),
            r["amount"],
            r["status"].as_str().unwrap_or("-")
        );
    }
    Ok(())
}
