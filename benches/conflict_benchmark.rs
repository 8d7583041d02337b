use channel_sync::conflict::ConflictDetector;
use channel_sync::model::{
    BookingSource, InternalReservation, PricingBreakdown, ReservationStatus, Room,
};
use chrono::{Duration, NaiveDate, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{thread_rng, Rng};

fn make_rooms(count: usize) -> Vec<Room> {
    (0..count)
        .map(|i| Room {
            id: format!("room-{i}"),
            number: format!("{}", 100 + i),
            room_type_code: if i % 3 == 0 { "SGL" } else { "DBL" }.to_string(),
            max_adults: 2,
            max_children: 2,
        })
        .collect()
}

fn make_reservations(rooms: &[Room], count: usize) -> Vec<InternalReservation> {
    let mut rng = thread_rng();
    let season_start = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
    let now = Utc::now();

    (0..count)
        .map(|i| {
            let room = &rooms[rng.gen_range(0..rooms.len())];
            let offset = rng.gen_range(0..90i64);
            let nights = rng.gen_range(1..8i64);
            let check_in = season_start + Duration::days(offset);
            InternalReservation {
                id: format!("res-{i}"),
                room_id: room.id.clone(),
                guest_id: format!("guest-{i}"),
                room_type_code: room.room_type_code.clone(),
                check_in,
                check_out: check_in + Duration::days(nights),
                adults: rng.gen_range(1..3),
                children: rng.gen_range(0..2),
                status: if rng.gen_bool(0.9) {
                    ReservationStatus::Confirmed
                } else {
                    ReservationStatus::Cancelled
                },
                pricing: PricingBreakdown::default(),
                source: BookingSource::BookingCom,
                booking_reference: format!("REF-{i}"),
                created_at: now,
                modified_at: now,
            }
        })
        .collect()
}

// Hot path of the booking flow: evaluate one candidate stay against a
// snapshot of the reservation calendar.
pub fn conflict_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("conflict_check");

    let rooms = make_rooms(50);
    for reservation_count in [100, 1_000, 10_000].iter() {
        let existing = make_reservations(&rooms, *reservation_count);
        let check_in = NaiveDate::from_ymd_opt(2025, 7, 10).unwrap();
        let check_out = NaiveDate::from_ymd_opt(2025, 7, 14).unwrap();

        group.bench_with_input(
            BenchmarkId::from_parameter(reservation_count),
            reservation_count,
            |b, _| {
                b.iter(|| {
                    black_box(ConflictDetector::evaluate_snapshot(
                        black_box("room-7"),
                        check_in,
                        check_out,
                        None,
                        &rooms,
                        &existing,
                    ))
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, conflict_benchmark);
criterion_main!(benches);
