use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use railo_booking::app_config::Config;
use railo_booking::{BookingSession, HttpReservationService, Outcome, ReservationService, ReservationView};
use railo_catalog::{CarNumber, FareClass, InMemorySeatInventory, SeatCode, SeatMap};
use railo_core::{check_access, AccessDecision, AuthSession, StaticTokenAuth};
use railo_order::TripSegment;
use railo_shared::{PassengerGroup, ReservationStatus};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "railo", version, about = "Train seat selection and reservation client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the seat map of a car
    Seats {
        #[arg(long, default_value = "GENERAL")]
        fare_class: FareClass,
        /// Defaults to the fare class's first car
        #[arg(long)]
        car: Option<u8>,
    },
    /// Pick seats and create a reservation
    Book(BookArgs),
    /// Show a reservation and whether its hold is still active
    Detail { reservation_id: i64 },
    /// Cancel a reservation
    Cancel { reservation_id: i64 },
}

#[derive(Args)]
struct BookArgs {
    #[arg(long)]
    schedule: i64,
    #[arg(long)]
    from: i64,
    #[arg(long)]
    to: i64,
    #[arg(long, default_value = "GENERAL")]
    fare_class: FareClass,
    #[arg(long)]
    car: Option<u8>,
    /// Passenger group as TYPE=COUNT, e.g. ADULT=2
    #[arg(long = "passenger", value_parser = parse_passenger, required = true)]
    passengers: Vec<PassengerGroup>,
    /// Seat to pick and its inventory id as CODE=ID, e.g. 1A=1001
    #[arg(long = "seat", value_parser = parse_seat, required = true)]
    seats: Vec<(SeatCode, i64)>,
}

fn parse_passenger(s: &str) -> Result<PassengerGroup, String> {
    let (kind, count) = s.split_once('=').ok_or_else(|| format!("expected TYPE=COUNT, got {}", s))?;
    let count = count.trim().parse::<u32>().map_err(|e| e.to_string())?;
    Ok(PassengerGroup::new(kind.parse()?, count))
}

fn parse_seat(s: &str) -> Result<(SeatCode, i64), String> {
    let (code, id) = s.split_once('=').ok_or_else(|| format!("expected CODE=ID, got {}", s))?;
    let code = code.trim().parse::<SeatCode>().map_err(|e| e.to_string())?;
    let id = id.trim().parse::<i64>().map_err(|e| e.to_string())?;
    Ok((code, id))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "railo_booking=debug,railo_order=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Seats { fare_class, car } => {
            let car = match car {
                Some(n) => CarNumber::new(n)?,
                None => fare_class.initial_car(),
            };
            if !fare_class.allows(car) {
                bail!("car {} is not available for {} fares", car, fare_class);
            }
            for option in fare_class.car_options() {
                println!("{}", option);
            }
            println!();
            print_seat_map(&SeatMap::generate(car, fare_class));
        }
        Command::Book(args) => book(args).await?,
        Command::Detail { reservation_id } => {
            let config = Config::load().context("Failed to load config")?;
            let service = connect(&config)?;
            let detail = service.fetch_detail(reservation_id).await?;
            let view = ReservationView::at(detail, chrono::Utc::now(), config.booking.hold_warning());
            print_view(&view);
        }
        Command::Cancel { reservation_id } => {
            let config = Config::load().context("Failed to load config")?;
            let service = connect(&config)?;
            let outcome = service.cancel(reservation_id).await?;
            println!("Reservation {}: {:?}", reservation_id, outcome);
        }
    }

    Ok(())
}

fn connect(config: &Config) -> Result<HttpReservationService> {
    let auth = Arc::new(StaticTokenAuth::new(config.auth.access_token.clone()));
    if check_access(auth.as_ref(), true) == AccessDecision::RedirectToLogin {
        bail!("Login required: set RAILO__AUTH__ACCESS_TOKEN");
    }
    tracing::info!(base_url = %config.service.base_url, authenticated = auth.is_authenticated(), "Reservation service configured");
    Ok(HttpReservationService::new(&config.service, auth)?)
}

async fn book(args: BookArgs) -> Result<()> {
    let config = Config::load().context("Failed to load config")?;
    let service = Arc::new(connect(&config)?);

    let car = match args.car {
        Some(n) => CarNumber::new(n)?,
        None => args.fare_class.initial_car(),
    };

    let mut inventory = InMemorySeatInventory::new();
    for (code, seat_id) in &args.seats {
        inventory.insert(car, *code, *seat_id)?;
    }

    let segment = TripSegment {
        train_schedule_id: args.schedule,
        departure_station_id: args.from,
        arrival_station_id: args.to,
    };
    let session = BookingSession::new(service, Arc::new(inventory), segment)
        .with_hold_warning(config.booking.hold_warning());

    session.open_selection(args.fare_class, args.passengers)?;
    if car != args.fare_class.initial_car() {
        session.change_car(car)?;
    }
    for (code, _) in &args.seats {
        session.toggle(*code)?;
    }

    if let Some(summary) = session.summary() {
        println!(
            "Car {}: {} ({}/{})",
            summary.car,
            summary.seat_list(),
            summary.selected_count,
            summary.max_seats
        );
    }
    session.commit()?;

    match session.submit().await? {
        Outcome::Applied(response) => {
            println!(
                "Reservation {} created, seat reservations {:?}",
                response.reservation_id, response.seat_reservation_ids
            );
        }
        Outcome::Discarded => println!("Booking abandoned"),
    }
    Ok(())
}

fn print_seat_map(map: &SeatMap) {
    println!("Car {} ({} seats)", map.car, map.capacity());
    for row in 1..=map.layout.rows() {
        let line = map
            .columns()
            .iter()
            .map(|column| {
                let code = SeatCode::new(row, *column);
                match map.get(&code) {
                    Some(seat) if seat.is_window => format!("[{:>3}]", code.to_string()),
                    Some(_) => format!(" {:>3} ", code.to_string()),
                    None => "     ".to_string(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ");
        println!("{}", line);
    }
}

fn print_view(view: &ReservationView) {
    let detail = &view.detail;
    println!(
        "{} {} {} -> {} on {} ({} - {})",
        detail.reservation_code,
        detail.train_name,
        detail.departure_station_name,
        detail.arrival_station_name,
        detail.operation_date,
        detail.departure_time,
        detail.arrival_time
    );
    for seat in &detail.seats {
        println!(
            "  car {} seat {} {} fare {}",
            seat.car_number, seat.seat_number, seat.passenger_type, seat.fare
        );
    }
    println!("  total fare {}", detail.total_fare());

    match (view.status, view.time_remaining) {
        (ReservationStatus::Expired, _) => println!("  EXPIRED at {} (not cancelled)", detail.expires_at),
        (ReservationStatus::Active, Some(left)) if view.expiring_soon => {
            println!("  ACTIVE, expires in {}s", left.num_seconds())
        }
        (ReservationStatus::Active, _) => println!("  ACTIVE until {}", detail.expires_at),
    }
}
