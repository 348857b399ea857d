//! Email templates

use jiff::{Timestamp, civil::Date};

use prestige::money::format_usd;

use crate::domain::{agreements::records::AgreementRecord, bookings::records::BookingRecord};

use super::EmailMessage;

fn usd(amount: u64) -> String {
    format_usd(i64::try_from(amount).unwrap_or(i64::MAX))
}

fn day(date: Date) -> String {
    date.strftime("%B %d, %Y").to_string()
}

fn rental_summary(booking: &BookingRecord) -> String {
    [
        format!(
            "Vehicle: {} {} {}",
            booking.car.year, booking.car.brand, booking.car.model
        ),
        format!(
            "Dates: {} to {} ({} days)",
            day(booking.start_date),
            day(booking.end_date),
            booking.pricing.total_days
        ),
        format!("Daily rate: {}", usd(booking.pricing.daily_rate)),
        format!("Subtotal: {}", usd(booking.pricing.subtotal)),
        format!("Deposit: {}", usd(booking.pricing.deposit_amount)),
        format!("Balance due: {}", usd(booking.pricing.final_amount)),
    ]
    .join("\n")
}

/// Confirmation sent to the customer when an admin confirms a booking.
#[must_use]
pub fn booking_confirmation(booking: &BookingRecord, sender: Option<String>) -> EmailMessage {
    let text = format!(
        "Dear {},\n\nYour reservation is confirmed.\n\n{}\n\nBooking reference: {}\n\nWe look forward to seeing you.\nPrestige Rentals",
        booking.customer.first_name,
        rental_summary(booking),
        booking.uuid,
    );

    EmailMessage {
        to: vec![booking.customer.email.clone()],
        from: sender,
        subject: format!(
            "Your {} {} reservation is confirmed",
            booking.car.brand, booking.car.model
        ),
        text,
        html: None,
    }
}

/// Copy of a new booking for the admin team.
#[must_use]
pub fn admin_booking_copy(
    booking: &BookingRecord,
    recipients: Vec<String>,
    sender: Option<String>,
) -> EmailMessage {
    let text = format!(
        "A new booking was created.\n\nCustomer: {} <{}>, {}\n{}\n\nDeposit status: {}\nBooking reference: {}\n",
        booking.customer.full_name(),
        booking.customer.email,
        booking.customer.phone,
        rental_summary(booking),
        booking.payment.deposit_status,
        booking.uuid,
    );

    EmailMessage {
        to: recipients,
        from: sender,
        subject: format!(
            "New booking: {} for {}",
            booking.car.model,
            booking.customer.full_name()
        ),
        text,
        html: None,
    }
}

/// Invitation to review and sign a rental agreement.
#[must_use]
pub fn agreement_invitation(agreement: &AgreementRecord, sender: Option<String>) -> EmailMessage {
    let mut sections = vec![
        format!("Dear {},", agreement.customer.first_name),
        "Please review and sign the rental agreement for your upcoming rental.".to_string(),
    ];

    if let Some(custom_message) = &agreement.custom_message {
        sections.push(custom_message.clone());
    }

    sections.push(format!(
        "Vehicle: {}\nDates: {} to {}\nTotal: {}",
        agreement.rental.vehicle(),
        day(agreement.rental.start_date),
        day(agreement.rental.end_date),
        usd(agreement.pricing.subtotal)
    ));
    sections.push(format!(
        "Agreement reference: {}\nThis invitation expires on {}.",
        agreement.uuid,
        agreement.expires_at.strftime("%B %d, %Y at %H:%M UTC"),
    ));
    sections.push("Prestige Rentals".to_string());

    EmailMessage {
        to: agreement.recipients.clone(),
        from: sender,
        subject: format!("Rental agreement for your {}", agreement.rental.vehicle()),
        text: sections.join("\n\n"),
        html: None,
    }
}

/// Message used to check notification settings end to end.
#[must_use]
pub fn test_notification(
    recipients: Vec<String>,
    sender: Option<String>,
    sent_at: Timestamp,
) -> EmailMessage {
    EmailMessage {
        to: recipients,
        from: sender,
        subject: "Prestige Rentals test notification".to_string(),
        text: format!(
            "This is a test notification sent at {sent_at}.\nIf you received it, admin notifications are working."
        ),
        html: None,
    }
}
