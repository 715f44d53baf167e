//! # Booking Lifecycle Manager
//!
//! Owns the booking state machine. This is the only code in the system
//! that mutates booking status.
//!
//! ## Operation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     create_booking                                      │
//! │                                                                         │
//! │  validate dates ── load car ── ┌ LOCK car ─────────────────────────┐   │
//! │                                │  conflict check (cheap, pre-auth) │   │
//! │                                │  authorize with processor         │   │
//! │                                │  ┌ TRANSACTION ────────────────┐  │   │
//! │                                │  │  conflict re-check          │  │   │
//! │                                │  │  insert booking (pending)   │  │   │
//! │                                │  └ COMMIT ─────────────────────┘  │   │
//! │                                └ UNLOCK ──────────────────────────┘   │
//! │                                                                         │
//! │                     complete_booking                                    │
//! │                                                                         │
//! │  load booking ── ┌ TRANSACTION ───────────────────────────┐            │
//! │                  │  confirmed → completed (guarded)       │            │
//! │                  │  award points (balance+ledger+notify)  │            │
//! │                  └ COMMIT: all four writes or none ───────┘            │
//! │                                                                         │
//! │                     cancel_booking                                      │
//! │                                                                         │
//! │  load ── authorize actor ── refund if captured ── guarded cancel write │
//! │          (the local write is the final committing step)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::gateway::{PaymentError, PaymentGateway};
use crate::locks::CarLocks;
use crate::reconciliation::PaymentReconciliation;
use crate::rewards::RewardsLedger;
use atlas_core::validation::validate_rental_request;
use atlas_core::{
    Booking, BookingStatus, Car, CoreError, PaymentStatus, RentalPeriod, RewardRecord, Role,
};
use atlas_db::{Database, DbError};

// =============================================================================
// Response Types
// =============================================================================

/// What `create_booking` hands back to the request layer.
#[derive(Debug, Clone)]
pub struct CreatedBooking {
    /// The freshly inserted booking (status Pending).
    pub booking: Booking,
    /// Handed to the paying client to finish the charge with the
    /// processor. Never persisted locally.
    pub payment_client_secret: String,
}

// =============================================================================
// Booking Service
// =============================================================================

/// The booking lifecycle manager.
///
/// Shared behind an `Arc` by the request layer; every method takes
/// `&self` and is safe to call concurrently.
pub struct BookingService {
    db: Database,
    payments: PaymentReconciliation,
    rewards: RewardsLedger,
    config: EngineConfig,
    locks: CarLocks,
}

impl BookingService {
    /// Creates the service over a database and a payment gateway.
    pub fn new(
        db: Database,
        gateway: Arc<dyn PaymentGateway>,
        config: EngineConfig,
    ) -> EngineResult<Self> {
        config.validate().map_err(CoreError::from)?;

        let payments = PaymentReconciliation::new(gateway, config.gateway_timeout);
        let rewards = RewardsLedger::new(db.clone(), config.reward_rate);

        Ok(BookingService {
            db,
            payments,
            rewards,
            config,
            locks: CarLocks::new(),
        })
    }

    /// The rewards ledger, for the read surfaces (balance, history,
    /// notification feed).
    pub fn rewards(&self) -> &RewardsLedger {
        &self.rewards
    }

    /// Whether an overlapping, non-cancelled booking already holds the
    /// car for the candidate range. A pure probe: creation re-checks
    /// under the car lock regardless of what this returned.
    pub async fn has_conflict(
        &self,
        car_id: &str,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    ) -> EngineResult<bool> {
        let period = RentalPeriod::new(start, end).map_err(CoreError::from)?;
        let mut conn = self.db.acquire().await?;
        Ok(self
            .db
            .bookings()
            .has_conflict(&mut conn, car_id, &period, self.config.turnover_policy)
            .await?)
    }

    /// Creates a booking: validates the request, authorizes payment for
    /// the computed total, and inserts the Pending record.
    ///
    /// The conflict check and the insert run under the car's lock, and
    /// the insert's transaction re-checks before writing, so the second
    /// of two racing requests observes the first and fails with a
    /// conflict.
    pub async fn create_booking(
        &self,
        car_id: &str,
        renter_id: &str,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    ) -> EngineResult<CreatedBooking> {
        let today = Utc::now().date_naive();
        let period = validate_rental_request(start, end, today).map_err(CoreError::from)?;

        let car = self
            .db
            .cars()
            .get_by_id(car_id)
            .await?
            .filter(|c| c.available)
            .ok_or_else(|| CoreError::not_found("Car", car_id))?;

        // Everything from the first conflict check to the insert commit
        // happens under this car's lock.
        let _guard = self.locks.lock(car_id).await;

        {
            let mut conn = self.db.acquire().await?;
            if self
                .db
                .bookings()
                .has_conflict(&mut conn, car_id, &period, self.config.turnover_policy)
                .await?
            {
                return Err(self.conflict(car_id, &period));
            }
        }

        let total = car.price_per_day().multiply_days(period.days());
        let auth = self
            .payments
            .authorize(total, &self.config.currency, &booking_metadata(&car, renter_id, &period))
            .await?;

        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4().to_string(),
            car_id: car.id.clone(),
            renter_id: renter_id.to_string(),
            start_date: period.start,
            end_date: period.end,
            total_price_cents: total.cents(),
            status: BookingStatus::Pending,
            payment_ref: Some(auth.id.clone()),
            payment_status: PaymentStatus::Authorized,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.db.begin().await?;

        // Commit-time re-check. Under the lock nothing can have raced in,
        // but the insert must never outlive the check's transaction.
        if self
            .db
            .bookings()
            .has_conflict(&mut tx, car_id, &period, self.config.turnover_policy)
            .await?
        {
            warn!(
                payment_ref = %auth.id,
                car_id = %car.id,
                "Conflict surfaced at commit time; authorization needs operator reconciliation"
            );
            return Err(self.conflict(car_id, &period));
        }

        if let Err(err) = self.db.bookings().insert(&mut tx, &booking).await {
            error!(
                payment_ref = %auth.id,
                %err,
                "Booking insert failed after authorization; reconcile with the processor by payment reference"
            );
            return Err(err.into());
        }

        if let Err(err) = tx.commit().await {
            error!(
                payment_ref = %auth.id,
                %err,
                "Booking commit failed after authorization; reconcile with the processor by payment reference"
            );
            return Err(DbError::from(err).into());
        }

        info!(
            booking_id = %booking.id,
            car_id = %car.id,
            renter_id,
            total = %total,
            days = period.days(),
            "Booking created"
        );

        Ok(CreatedBooking {
            booking,
            payment_client_secret: auth.client_secret,
        })
    }

    /// Confirms a pending booking once payment authorization has been
    /// verified (operator action or processor callback). Status write
    /// only, no side effects.
    pub async fn confirm_booking(&self, booking_id: &str) -> EngineResult<()> {
        let booking = self.load(booking_id).await?;

        let mut conn = self.db.acquire().await?;
        if !self.db.bookings().confirm(&mut conn, booking_id).await? {
            return Err(
                CoreError::invalid_transition(booking_id, booking.status, BookingStatus::Confirmed)
                    .into(),
            );
        }

        info!(booking_id, "Booking confirmed");
        Ok(())
    }

    /// Records that the processor captured the authorized charge.
    /// Driven by the payment-confirmation callback.
    pub async fn record_payment_captured(&self, booking_id: &str) -> EngineResult<()> {
        let booking = self.load(booking_id).await?;

        let mut conn = self.db.acquire().await?;
        if !self
            .db
            .bookings()
            .mark_payment_captured(&mut conn, booking_id)
            .await?
        {
            return Err(CoreError::invalid_transition(
                booking_id,
                booking.payment_status,
                PaymentStatus::Captured,
            )
            .into());
        }

        info!(booking_id, "Payment capture recorded");
        Ok(())
    }

    /// Completes a confirmed booking and credits loyalty points, as one
    /// atomic unit: if the award fails, the status flip rolls back with
    /// it, so a booking is never "completed but uncredited".
    ///
    /// Completing an already-completed booking is an idempotent no-op
    /// returning the original reward record.
    pub async fn complete_booking(&self, booking_id: &str) -> EngineResult<RewardRecord> {
        let booking = self.load(booking_id).await?;

        if booking.status == BookingStatus::Completed {
            // Replay of a finished completion: hand back the existing
            // credit. The award's own guard covers the (unreachable by
            // construction) completed-but-uncredited case.
            let mut tx = self.db.begin().await?;
            let record = self.rewards.award(&mut tx, &booking).await?;
            tx.commit().await.map_err(DbError::from)?;
            return Ok(record);
        }

        if booking.status != BookingStatus::Confirmed {
            return Err(
                CoreError::invalid_transition(booking_id, booking.status, BookingStatus::Completed)
                    .into(),
            );
        }

        let mut tx = self.db.begin().await?;

        if !self.db.bookings().complete(&mut tx, booking_id).await? {
            // A racing writer moved the booking since the load above.
            return Err(
                CoreError::invalid_transition(booking_id, booking.status, BookingStatus::Completed)
                    .into(),
            );
        }

        let record = self.rewards.award(&mut tx, &booking).await?;
        tx.commit().await.map_err(DbError::from)?;

        info!(
            booking_id,
            points = record.points_earned,
            "Booking completed and rewarded"
        );

        Ok(record)
    }

    /// Cancels a pending or confirmed booking.
    ///
    /// The actor must be the booking's renter or an admin. If the charge
    /// was captured, the processor refund must succeed first; the local
    /// write is the final committing step.
    ///
    /// ## Retry Policy
    /// If the final write fails after a successful refund, retry this
    /// operation: the fix is retrying the write, not the refund, and the
    /// processor rejects a second refund of the same charge rather than
    /// paying twice.
    pub async fn cancel_booking(
        &self,
        booking_id: &str,
        actor_id: &str,
        actor_role: Role,
    ) -> EngineResult<()> {
        let booking = self.load(booking_id).await?;

        if actor_role != Role::Admin && booking.renter_id != actor_id {
            return Err(CoreError::unauthorized(
                actor_id,
                format!("cancel booking {booking_id}"),
            )
            .into());
        }

        if !booking.status.can_transition_to(BookingStatus::Cancelled) {
            return Err(
                CoreError::invalid_transition(booking_id, booking.status, BookingStatus::Cancelled)
                    .into(),
            );
        }

        // Captured money comes back before the reservation is released;
        // anything less leaves a cancelled booking holding the renter's
        // funds.
        let (refunded, payment_status) = if booking.payment_status == PaymentStatus::Captured {
            let payment_ref =
                booking
                    .payment_ref
                    .as_deref()
                    .ok_or_else(|| PaymentError::MissingReference {
                        booking_id: booking_id.to_string(),
                    })?;

            let receipt = self.payments.refund(payment_ref).await?;
            info!(booking_id, refund_id = %receipt.id, "Refund issued for cancellation");
            (true, PaymentStatus::Refunded)
        } else {
            (false, booking.payment_status)
        };

        let mut conn = self.db.acquire().await?;
        match self
            .db
            .bookings()
            .cancel(&mut conn, booking_id, payment_status)
            .await
        {
            Ok(true) => {
                info!(booking_id, actor_id, "Booking cancelled");
                Ok(())
            }
            Ok(false) => {
                // A racing writer moved the booking between load and write.
                if refunded {
                    error!(
                        booking_id,
                        payment_ref = ?booking.payment_ref,
                        "Refund succeeded but booking left its cancellable state; needs operator reconciliation"
                    );
                }
                Err(CoreError::invalid_transition(
                    booking_id,
                    booking.status,
                    BookingStatus::Cancelled,
                )
                .into())
            }
            Err(err) => {
                if refunded {
                    error!(
                        booking_id,
                        payment_ref = ?booking.payment_ref,
                        %err,
                        "Refund succeeded but cancel write failed; retry the cancellation (the write, not the refund)"
                    );
                }
                Err(err.into())
            }
        }
    }

    /// Gets a booking. Owner or admin only.
    pub async fn get_booking(
        &self,
        booking_id: &str,
        requester_id: &str,
        requester_role: Role,
    ) -> EngineResult<Booking> {
        let booking = self.load(booking_id).await?;

        if requester_role != Role::Admin && booking.renter_id != requester_id {
            return Err(CoreError::unauthorized(
                requester_id,
                format!("view booking {booking_id}"),
            )
            .into());
        }

        Ok(booking)
    }

    /// All of a renter's bookings, newest first.
    pub async fn list_bookings_for_renter(&self, renter_id: &str) -> EngineResult<Vec<Booking>> {
        Ok(self.db.bookings().list_for_renter(renter_id).await?)
    }

    /// Every booking, newest first. Operator surface.
    pub async fn list_all_bookings(&self) -> EngineResult<Vec<Booking>> {
        Ok(self.db.bookings().list_all().await?)
    }

    async fn load(&self, booking_id: &str) -> EngineResult<Booking> {
        self.db
            .bookings()
            .get_by_id(booking_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Booking", booking_id).into())
    }

    fn conflict(&self, car_id: &str, period: &RentalPeriod) -> EngineError {
        CoreError::Conflict {
            car_id: car_id.to_string(),
            start: period.start,
            end: period.end,
        }
        .into()
    }
}

/// Metadata attached to the processor-side payment intent, so charges
/// can be traced back to bookings from the processor dashboard.
fn booking_metadata(car: &Car, renter_id: &str, period: &RentalPeriod) -> HashMap<String, String> {
    HashMap::from([
        ("car_id".to_string(), car.id.clone()),
        ("renter_id".to_string(), renter_id.to_string()),
        ("start_date".to_string(), period.start.to_string()),
        ("end_date".to_string(), period.end.to_string()),
        ("days".to_string(), period.days().to_string()),
    ])
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::mock::MockGateway;
    use atlas_core::{TurnoverPolicy, User, ValidationError};
    use atlas_db::DbConfig;
    use chrono::{Days, NaiveDate};
    use std::time::Duration;

    struct Rig {
        service: Arc<BookingService>,
        db: Database,
        gateway: Arc<MockGateway>,
        car: Car,
        renter: User,
        admin: User,
    }

    /// Dates are validated against the wall clock, so tests book relative
    /// to today.
    fn days_ahead(n: u64) -> NaiveDate {
        Utc::now().date_naive() + Days::new(n)
    }

    fn make_user(role: Role) -> User {
        User {
            id: Uuid::new_v4().to_string(),
            name: "Test User".to_string(),
            email: format!("{}@example.com", Uuid::new_v4()),
            role,
            reward_points: 0,
            created_at: Utc::now(),
        }
    }

    async fn rig_with(config: EngineConfig) -> Rig {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let gateway = Arc::new(MockGateway::new());

        let car = Car {
            id: Uuid::new_v4().to_string(),
            name: "Toyota RAV4".to_string(),
            model: "2023 XLE".to_string(),
            price_per_day_cents: 5000,
            available: true,
            created_at: Utc::now(),
        };
        db.cars().insert(&car).await.unwrap();

        let renter = make_user(Role::Renter);
        db.users().insert(&renter).await.unwrap();
        let admin = make_user(Role::Admin);
        db.users().insert(&admin).await.unwrap();

        let gateway_dyn: Arc<dyn PaymentGateway> = gateway.clone();
        let service =
            Arc::new(BookingService::new(db.clone(), gateway_dyn, config).unwrap());

        Rig {
            service,
            db,
            gateway,
            car,
            renter,
            admin,
        }
    }

    async fn rig() -> Rig {
        rig_with(EngineConfig::default()).await
    }

    // -------------------------------------------------------------------------
    // Creation
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_create_booking_happy_path() {
        let rig = rig().await;

        let created = rig
            .service
            .create_booking(&rig.car.id, &rig.renter.id, days_ahead(1), days_ahead(4))
            .await
            .unwrap();

        let booking = &created.booking;
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.payment_status, PaymentStatus::Authorized);
        // 3 days at $50.00/day
        assert_eq!(booking.total_price_cents, 15000);
        assert_eq!(booking.rental_days(), 3);
        assert!(booking.payment_ref.is_some());
        assert!(!created.payment_client_secret.is_empty());

        // Exactly one authorization, for the full total
        assert_eq!(rig.gateway.authorized_amounts(), vec![15000]);

        // Persisted and visible to the renter
        let listed = rig
            .service
            .list_bookings_for_renter(&rig.renter.id)
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, booking.id);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_dates() {
        let rig = rig().await;

        // Start in the past
        let yesterday = Utc::now().date_naive() - Days::new(1);
        let err = rig
            .service
            .create_booking(&rig.car.id, &rig.renter.id, yesterday, days_ahead(3))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Core(CoreError::Validation(ValidationError::DateInPast { .. }))
        ));
        assert!(!err.is_retryable());

        // Inverted range
        let err = rig
            .service
            .create_booking(&rig.car.id, &rig.renter.id, days_ahead(4), days_ahead(1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Core(CoreError::Validation(
                ValidationError::StartNotBeforeEnd { .. }
            ))
        ));

        // Nothing touched the processor
        assert_eq!(rig.gateway.authorize_count(), 0);
    }

    #[tokio::test]
    async fn test_create_unknown_or_unavailable_car() {
        let rig = rig().await;

        let err = rig
            .service
            .create_booking("no-such-car", &rig.renter.id, days_ahead(1), days_ahead(3))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Core(CoreError::NotFound { .. })));

        rig.db.cars().set_available(&rig.car.id, false).await.unwrap();
        let err = rig
            .service
            .create_booking(&rig.car.id, &rig.renter.id, days_ahead(1), days_ahead(3))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Core(CoreError::NotFound { .. })));

        assert_eq!(rig.gateway.authorize_count(), 0);
    }

    #[tokio::test]
    async fn test_create_overlapping_booking_conflicts() {
        let rig = rig().await;

        rig.service
            .create_booking(&rig.car.id, &rig.renter.id, days_ahead(1), days_ahead(5))
            .await
            .unwrap();

        let err = rig
            .service
            .create_booking(&rig.car.id, &rig.renter.id, days_ahead(3), days_ahead(7))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Core(CoreError::Conflict { .. })));
        assert!(!err.is_retryable());

        // The losing request was rejected before reaching the processor
        assert_eq!(rig.gateway.authorize_count(), 1);
    }

    #[tokio::test]
    async fn test_handover_day_follows_configured_policy() {
        // Default: the handover day is blocked
        let rig = rig().await;
        rig.service
            .create_booking(&rig.car.id, &rig.renter.id, days_ahead(1), days_ahead(3))
            .await
            .unwrap();
        let err = rig
            .service
            .create_booking(&rig.car.id, &rig.renter.id, days_ahead(3), days_ahead(5))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Core(CoreError::Conflict { .. })));

        // Relaxed policy: back-to-back is fine
        let rig = rig_with(
            EngineConfig::default().turnover_policy(TurnoverPolicy::SameDayAllowed),
        )
        .await;
        rig.service
            .create_booking(&rig.car.id, &rig.renter.id, days_ahead(1), days_ahead(3))
            .await
            .unwrap();
        rig.service
            .create_booking(&rig.car.id, &rig.renter.id, days_ahead(3), days_ahead(5))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_racing_creates_exactly_one_wins() {
        let rig = rig().await;

        let s1 = rig.service.clone();
        let s2 = rig.service.clone();
        let (car1, renter1) = (rig.car.id.clone(), rig.renter.id.clone());
        let (car2, renter2) = (rig.car.id.clone(), rig.renter.id.clone());

        let h1 = tokio::spawn(async move {
            s1.create_booking(&car1, &renter1, days_ahead(1), days_ahead(5)).await
        });
        let h2 = tokio::spawn(async move {
            s2.create_booking(&car2, &renter2, days_ahead(3), days_ahead(7)).await
        });

        let results = vec![h1.await.unwrap(), h2.await.unwrap()];
        let (oks, errs): (Vec<_>, Vec<_>) = results.into_iter().partition(|r| r.is_ok());

        assert_eq!(oks.len(), 1, "exactly one racing create must succeed");
        assert_eq!(errs.len(), 1);
        let err = errs.into_iter().next().unwrap().unwrap_err();
        assert!(matches!(err, EngineError::Core(CoreError::Conflict { .. })));

        // Only the winner reached the processor
        assert_eq!(rig.gateway.authorize_count(), 1);

        // Invariant: active bookings on the car are pairwise disjoint
        let active = rig.db.bookings().list_active_for_car(&rig.car.id).await.unwrap();
        assert_eq!(active.len(), 1);
        for (i, a) in active.iter().enumerate() {
            for b in active.iter().skip(i + 1) {
                assert!(!a
                    .period()
                    .overlaps(&b.period(), TurnoverPolicy::SameDayBlocked));
            }
        }
    }

    #[tokio::test]
    async fn test_total_price_frozen_against_price_changes() {
        let rig = rig().await;

        let created = rig
            .service
            .create_booking(&rig.car.id, &rig.renter.id, days_ahead(1), days_ahead(4))
            .await
            .unwrap();
        assert_eq!(created.booking.total_price_cents, 15000);

        // Catalog repricing after the fact
        rig.db.cars().update_price(&rig.car.id, 9900).await.unwrap();

        let reloaded = rig
            .service
            .get_booking(&created.booking.id, &rig.renter.id, Role::Renter)
            .await
            .unwrap();
        assert_eq!(reloaded.total_price_cents, 15000);
    }

    #[tokio::test]
    async fn test_authorization_failure_creates_nothing() {
        let rig = rig().await;
        rig.gateway.fail_authorize(true);

        let err = rig
            .service
            .create_booking(&rig.car.id, &rig.renter.id, days_ahead(1), days_ahead(4))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Payment(_)));
        assert!(err.is_retryable());

        assert!(rig
            .service
            .list_bookings_for_renter(&rig.renter.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_slow_gateway_fails_creation_with_timeout() {
        let rig = rig_with(
            EngineConfig::default().gateway_timeout(Duration::from_millis(20)),
        )
        .await;
        rig.gateway.set_latency(Duration::from_millis(150));

        let err = rig
            .service
            .create_booking(&rig.car.id, &rig.renter.id, days_ahead(1), days_ahead(4))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Payment(PaymentError::Timeout { .. })
        ));
        assert!(rig
            .service
            .list_bookings_for_renter(&rig.renter.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_has_conflict_probe() {
        let rig = rig().await;

        assert!(!rig
            .service
            .has_conflict(&rig.car.id, days_ahead(1), days_ahead(5))
            .await
            .unwrap());

        rig.service
            .create_booking(&rig.car.id, &rig.renter.id, days_ahead(1), days_ahead(5))
            .await
            .unwrap();

        assert!(rig
            .service
            .has_conflict(&rig.car.id, days_ahead(3), days_ahead(7))
            .await
            .unwrap());
        assert!(!rig
            .service
            .has_conflict(&rig.car.id, days_ahead(8), days_ahead(10))
            .await
            .unwrap());
    }

    // -------------------------------------------------------------------------
    // Confirmation and capture
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_confirm_flow() {
        let rig = rig().await;
        let created = rig
            .service
            .create_booking(&rig.car.id, &rig.renter.id, days_ahead(1), days_ahead(4))
            .await
            .unwrap();
        let id = created.booking.id;

        rig.service.confirm_booking(&id).await.unwrap();
        let booking = rig
            .service
            .get_booking(&id, &rig.admin.id, Role::Admin)
            .await
            .unwrap();
        assert_eq!(booking.status, BookingStatus::Confirmed);

        // Confirming twice is an illegal move
        let err = rig.service.confirm_booking(&id).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::Core(CoreError::InvalidTransition { .. })
        ));

        // Unknown booking
        let err = rig.service.confirm_booking("no-such-booking").await.unwrap_err();
        assert!(matches!(err, EngineError::Core(CoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_record_payment_captured() {
        let rig = rig().await;
        let created = rig
            .service
            .create_booking(&rig.car.id, &rig.renter.id, days_ahead(1), days_ahead(4))
            .await
            .unwrap();
        let id = created.booking.id;

        rig.service.record_payment_captured(&id).await.unwrap();
        let booking = rig
            .service
            .get_booking(&id, &rig.renter.id, Role::Renter)
            .await
            .unwrap();
        assert_eq!(booking.payment_status, PaymentStatus::Captured);

        // Capturing twice is rejected
        let err = rig.service.record_payment_captured(&id).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::Core(CoreError::InvalidTransition { .. })
        ));
    }

    // -------------------------------------------------------------------------
    // Completion and rewards
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_complete_credits_points_exactly_once() {
        let rig = rig().await;
        let created = rig
            .service
            .create_booking(&rig.car.id, &rig.renter.id, days_ahead(1), days_ahead(4))
            .await
            .unwrap();
        let id = created.booking.id;
        rig.service.confirm_booking(&id).await.unwrap();

        // floor($150.00 × 10%) = 15 points
        let record = rig.service.complete_booking(&id).await.unwrap();
        assert_eq!(record.points_earned, 15);
        assert_eq!(
            rig.service.rewards().points_balance(&rig.renter.id).await.unwrap(),
            15
        );

        // Replay: same record back, nothing credited twice
        let replay = rig.service.complete_booking(&id).await.unwrap();
        assert_eq!(replay.id, record.id);
        assert_eq!(
            rig.service.rewards().points_balance(&rig.renter.id).await.unwrap(),
            15
        );
        assert_eq!(
            rig.service.rewards().history(&rig.renter.id).await.unwrap().len(),
            1
        );
        assert_eq!(
            rig.service
                .rewards()
                .notifications_for(&rig.renter.id)
                .await
                .unwrap()
                .len(),
            1
        );

        let booking = rig
            .service
            .get_booking(&id, &rig.renter.id, Role::Renter)
            .await
            .unwrap();
        assert_eq!(booking.status, BookingStatus::Completed);
    }

    #[tokio::test]
    async fn test_complete_requires_confirmed() {
        let rig = rig().await;
        let created = rig
            .service
            .create_booking(&rig.car.id, &rig.renter.id, days_ahead(1), days_ahead(4))
            .await
            .unwrap();
        let id = created.booking.id;

        // Pending → Completed skips a state
        let err = rig.service.complete_booking(&id).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::Core(CoreError::InvalidTransition { .. })
        ));
        // No points were credited
        assert_eq!(
            rig.service.rewards().points_balance(&rig.renter.id).await.unwrap(),
            0
        );
    }

    // -------------------------------------------------------------------------
    // Cancellation
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_cancel_uncaptured_issues_no_refund() {
        let rig = rig().await;
        let created = rig
            .service
            .create_booking(&rig.car.id, &rig.renter.id, days_ahead(1), days_ahead(4))
            .await
            .unwrap();
        let id = created.booking.id;

        rig.service
            .cancel_booking(&id, &rig.renter.id, Role::Renter)
            .await
            .unwrap();

        let booking = rig
            .service
            .get_booking(&id, &rig.renter.id, Role::Renter)
            .await
            .unwrap();
        assert_eq!(booking.status, BookingStatus::Cancelled);
        // Authorization stays as-is; nothing was captured, nothing refunded
        assert_eq!(booking.payment_status, PaymentStatus::Authorized);
        assert_eq!(rig.gateway.refund_count(), 0);

        // The car frees up
        assert!(!rig
            .service
            .has_conflict(&rig.car.id, days_ahead(1), days_ahead(4))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_cancel_captured_refunds_then_cancels() {
        let rig = rig().await;
        let created = rig
            .service
            .create_booking(&rig.car.id, &rig.renter.id, days_ahead(1), days_ahead(4))
            .await
            .unwrap();
        let id = created.booking.id;
        let payment_ref = created.booking.payment_ref.clone().unwrap();

        rig.service.confirm_booking(&id).await.unwrap();
        rig.service.record_payment_captured(&id).await.unwrap();

        // Admin cancels on the renter's behalf
        rig.service
            .cancel_booking(&id, &rig.admin.id, Role::Admin)
            .await
            .unwrap();

        // Exactly one refund, keyed by the stored reference
        assert_eq!(rig.gateway.refunded_refs(), vec![payment_ref]);

        let booking = rig
            .service
            .get_booking(&id, &rig.admin.id, Role::Admin)
            .await
            .unwrap();
        assert_eq!(booking.status, BookingStatus::Cancelled);
        assert_eq!(booking.payment_status, PaymentStatus::Refunded);
    }

    #[tokio::test]
    async fn test_cancel_refund_failure_leaves_booking_untouched() {
        let rig = rig().await;
        let created = rig
            .service
            .create_booking(&rig.car.id, &rig.renter.id, days_ahead(1), days_ahead(4))
            .await
            .unwrap();
        let id = created.booking.id;
        rig.service.confirm_booking(&id).await.unwrap();
        rig.service.record_payment_captured(&id).await.unwrap();

        rig.gateway.fail_refund(true);
        let err = rig
            .service
            .cancel_booking(&id, &rig.renter.id, Role::Renter)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Payment(_)));
        assert!(err.is_retryable());

        // No partial cancellation state
        let booking = rig
            .service
            .get_booking(&id, &rig.renter.id, Role::Renter)
            .await
            .unwrap();
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.payment_status, PaymentStatus::Captured);

        // The caller retries once the gateway recovers
        rig.gateway.fail_refund(false);
        rig.service
            .cancel_booking(&id, &rig.renter.id, Role::Renter)
            .await
            .unwrap();
        assert_eq!(rig.gateway.refund_count(), 1);
    }

    #[tokio::test]
    async fn test_cancel_requires_owner_or_admin() {
        let rig = rig().await;
        let created = rig
            .service
            .create_booking(&rig.car.id, &rig.renter.id, days_ahead(1), days_ahead(4))
            .await
            .unwrap();
        let id = created.booking.id;

        let err = rig
            .service
            .cancel_booking(&id, "some-other-renter", Role::Renter)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Core(CoreError::Unauthorized { .. })
        ));

        // No state change, no refund
        let booking = rig
            .service
            .get_booking(&id, &rig.renter.id, Role::Renter)
            .await
            .unwrap();
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(rig.gateway.refund_count(), 0);
    }

    #[tokio::test]
    async fn test_cancel_terminal_booking_rejected() {
        let rig = rig().await;
        let created = rig
            .service
            .create_booking(&rig.car.id, &rig.renter.id, days_ahead(1), days_ahead(4))
            .await
            .unwrap();
        let id = created.booking.id;
        rig.service.confirm_booking(&id).await.unwrap();
        rig.service.complete_booking(&id).await.unwrap();

        let err = rig
            .service
            .cancel_booking(&id, &rig.admin.id, Role::Admin)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Core(CoreError::InvalidTransition { .. })
        ));
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_get_booking_authorization() {
        let rig = rig().await;
        let created = rig
            .service
            .create_booking(&rig.car.id, &rig.renter.id, days_ahead(1), days_ahead(4))
            .await
            .unwrap();
        let id = created.booking.id;

        // Owner and admin may read
        rig.service
            .get_booking(&id, &rig.renter.id, Role::Renter)
            .await
            .unwrap();
        rig.service
            .get_booking(&id, &rig.admin.id, Role::Admin)
            .await
            .unwrap();

        // A stranger may not
        let err = rig
            .service
            .get_booking(&id, "someone-else", Role::Renter)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Core(CoreError::Unauthorized { .. })
        ));

        let err = rig
            .service
            .get_booking("no-such-booking", &rig.admin.id, Role::Admin)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Core(CoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_list_all_bookings() {
        let rig = rig().await;

        let second_car = Car {
            id: Uuid::new_v4().to_string(),
            name: "Honda CR-V".to_string(),
            model: "2023 EX".to_string(),
            price_per_day_cents: 6800,
            available: true,
            created_at: Utc::now(),
        };
        rig.db.cars().insert(&second_car).await.unwrap();

        rig.service
            .create_booking(&rig.car.id, &rig.renter.id, days_ahead(1), days_ahead(4))
            .await
            .unwrap();
        rig.service
            .create_booking(&second_car.id, &rig.renter.id, days_ahead(1), days_ahead(4))
            .await
            .unwrap();

        assert_eq!(rig.service.list_all_bookings().await.unwrap().len(), 2);
        assert_eq!(
            rig.service
                .list_bookings_for_renter(&rig.renter.id)
                .await
                .unwrap()
                .len(),
            2
        );
        assert!(rig
            .service
            .list_bookings_for_renter("nobody")
            .await
            .unwrap()
            .is_empty());
    }
}
