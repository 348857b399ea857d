//! Test helpers.

use std::sync::Arc;

use jiff::{Timestamp, civil::date};
use rust_decimal::Decimal;
use salvo::{affix_state::inject, prelude::*};
use uuid::Uuid;

use prestige::{
    agreements::AgreementStatus,
    bookings::{BookingStatus, DepositStatus, FinalPaymentStatus},
    invoices::{InvoiceStatus, LineItem},
};
use prestige_app::{
    auth::{AdminSession, AdminTokenUuid, MockAuthService},
    context::AppContext,
    domain::{
        agreements::{
            MockAgreementsService,
            records::{AgreementRecord, AgreementUuid, RentalSnapshot},
        },
        bookings::{
            MockBookingsService,
            records::{
                BookingPricing, BookingRecord, BookingUuid, CarSnapshot, CustomerDetails,
                PaymentRecord,
            },
        },
        invoices::{
            MockInvoicesService,
            records::{DepositRequirement, InvoiceCustomer, InvoiceRecord, InvoiceUuid},
        },
        settings::{MockSettingsService, records::NotificationSettings},
    },
    payments::webhook::DEFAULT_TOLERANCE_SECONDS,
};

use crate::{
    extensions::*,
    state::{State, WebhookSettings},
};

pub(crate) const TEST_TOKEN_UUID: Uuid = Uuid::from_u128(0x0192_0000_0000_7000_8000_0000_0000_0001);

pub(crate) const TEST_WEBHOOK_SECRET: &str = "whsec_test";

/// One mock per service; any call without a matching expectation fails the test.
#[derive(Default)]
pub(crate) struct Mocks {
    pub bookings: MockBookingsService,
    pub agreements: MockAgreementsService,
    pub invoices: MockInvoicesService,
    pub settings: MockSettingsService,
    pub auth: MockAuthService,
}

impl Mocks {
    pub(crate) fn into_state(self) -> Arc<State> {
        State::shared(
            AppContext {
                bookings: Arc::new(self.bookings),
                agreements: Arc::new(self.agreements),
                invoices: Arc::new(self.invoices),
                settings: Arc::new(self.settings),
                auth: Arc::new(self.auth),
            },
            WebhookSettings {
                secret: Some(TEST_WEBHOOK_SECRET.to_string()),
                tolerance_seconds: DEFAULT_TOLERANCE_SECONDS,
            },
        )
    }
}

#[salvo::handler]
pub(crate) async fn inject_admin_session(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    depot.insert_admin_session(AdminSession {
        token_uuid: AdminTokenUuid::from_uuid(TEST_TOKEN_UUID),
        label: "test".to_string(),
    });

    ctrl.call_next(req, depot, res).await;
}

pub(crate) fn service(mocks: Mocks, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(mocks.into_state()))
            .hoop(inject_admin_session)
            .push(route),
    )
}

pub(crate) fn bookings_service(bookings: MockBookingsService, route: Router) -> Service {
    service(
        Mocks {
            bookings,
            ..Mocks::default()
        },
        route,
    )
}

pub(crate) fn agreements_service(agreements: MockAgreementsService, route: Router) -> Service {
    service(
        Mocks {
            agreements,
            ..Mocks::default()
        },
        route,
    )
}

pub(crate) fn invoices_service(invoices: MockInvoicesService, route: Router) -> Service {
    service(
        Mocks {
            invoices,
            ..Mocks::default()
        },
        route,
    )
}

pub(crate) fn settings_service(settings: MockSettingsService, route: Router) -> Service {
    service(
        Mocks {
            settings,
            ..Mocks::default()
        },
        route,
    )
}

pub(crate) fn make_customer() -> CustomerDetails {
    CustomerDetails {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        phone: "+1 555 0100".to_string(),
        drivers_license: "D1234567".to_string(),
    }
}

/// Three days of a 500.00 per day car, deposit authorized.
pub(crate) fn make_booking(uuid: BookingUuid) -> BookingRecord {
    BookingRecord {
        uuid,
        customer_id: "customer-1".to_string(),
        stripe_customer_id: "cus_123".to_string(),
        payment_method_id: Some("pm_card".to_string()),
        car: CarSnapshot {
            id: "huracan-evo".to_string(),
            brand: "Lamborghini".to_string(),
            model: "Huracan EVO".to_string(),
            year: 2024,
            daily_price: 50_000,
        },
        start_date: date(2026, 5, 1),
        end_date: date(2026, 5, 4),
        pricing: BookingPricing {
            daily_rate: 50_000,
            total_days: 3,
            subtotal: 150_000,
            deposit_amount: 45_000,
            final_amount: 105_000,
            additional_charges: 0,
        },
        customer: make_customer(),
        payment: PaymentRecord {
            deposit_intent_id: Some("pi_deposit".to_string()),
            deposit_status: DepositStatus::Authorized,
            final_intent_id: None,
            final_status: FinalPaymentStatus::Pending,
            adjustments: Vec::new(),
        },
        status: BookingStatus::Pending,
        cancellation: None,
        reschedules: Vec::new(),
        notes: None,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

pub(crate) fn make_agreement(uuid: AgreementUuid, booking: BookingUuid) -> AgreementRecord {
    let source = make_booking(booking);

    AgreementRecord {
        uuid,
        booking_uuid: booking,
        status: AgreementStatus::Pending,
        recipients: vec!["ada@example.com".to_string()],
        custom_message: None,
        sent_at: Timestamp::UNIX_EPOCH,
        expires_at: Timestamp::MAX,
        email_sent: true,
        completed_at: None,
        customer: source.customer,
        rental: RentalSnapshot {
            car_id: source.car.id,
            brand: source.car.brand,
            model: source.car.model,
            year: source.car.year,
            start_date: source.start_date,
            end_date: source.end_date,
            total_days: source.pricing.total_days,
        },
        pricing: source.pricing,
        submission: None,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

/// Two lines at 8.25% tax with a 25.00 discount: 600.00 / 47.44 / 622.44.
pub(crate) fn make_invoice(uuid: InvoiceUuid) -> InvoiceRecord {
    InvoiceRecord {
        uuid,
        number: "INV-20260501-0001".to_string(),
        customer: InvoiceCustomer {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: None,
            address: None,
        },
        items: vec![
            LineItem {
                description: "Chauffeur service".to_string(),
                quantity: 2,
                unit_price: 25_000,
                amount: 50_000,
            },
            LineItem {
                description: "Detailing".to_string(),
                quantity: 1,
                unit_price: 10_000,
                amount: 10_000,
            },
        ],
        tax_rate: Decimal::new(825, 2),
        discount_amount: 2_500,
        subtotal: 60_000,
        tax_amount: 4_744,
        total_amount: 62_244,
        deposit: DepositRequirement::default(),
        issue_date: date(2026, 5, 1),
        due_date: date(2026, 5, 31),
        notes: None,
        status: InvoiceStatus::Draft,
        sent_at: None,
        paid_at: None,
        cancelled_at: None,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

pub(crate) fn make_settings() -> NotificationSettings {
    NotificationSettings {
        admin_recipients: vec!["ops@prestige.example".to_string()],
        ..NotificationSettings::default()
    }
}
