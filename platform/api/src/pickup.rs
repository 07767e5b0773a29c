//! What happens when a dog is collected: the appointment leaves the active
//! book, the groomer's note about the owner is carried over to the customer
//! and the visit is written to the dog's service history.

use sqlx::PgConnection;

use crate::database::{Appointment, AppointmentStatus, Customer, Dog, NewService, ServiceHistory};

#[derive(Debug, Clone, serde::Serialize)]
pub struct PickupOutcome {
	#[serde(flatten)]
	pub appointment: Appointment,
	/// The history entry written for the visit, `None` when the appointment
	/// has no dog.
	pub service_history: Option<ServiceHistory>,
	pub customer_note_synced: bool,
}

/// Must run on the connection of the transaction that changed the status.
pub async fn complete_pickup(tx: &mut PgConnection, appointment: Appointment) -> sqlx::Result<PickupOutcome> {
	debug_assert_eq!(appointment.appointment_status, AppointmentStatus::PickedUp);

	let appointment = Appointment::deactivate(&mut *tx, appointment.id)
		.await?
		.unwrap_or(appointment);

	let Some(dog_id) = appointment.dog_id else {
		return Ok(PickupOutcome {
			appointment,
			service_history: None,
			customer_note_synced: false,
		});
	};

	let mut customer_note_synced = false;

	let note = appointment.customer_note.as_deref().map(str::trim).filter(|n| !n.is_empty());
	if let Some(note) = note {
		if let Some(dog) = Dog::by_id(&mut *tx, dog_id).await? {
			if let Some(customer) = Customer::by_id(&mut *tx, dog.customer_id).await? {
				if customer.customer_note.as_deref() != Some(note) {
					Customer::set_note(&mut *tx, customer.id, note).await?;
					customer_note_synced = true;
				}
			}
		}
	}

	let service = NewService {
		service: appointment.today_services.as_deref(),
		price: appointment.today_price.as_deref(),
		note: appointment.today_note.as_deref(),
	};

	let history = ServiceHistory::upsert(&mut *tx, dog_id, appointment.appointment_date, &service).await?;

	tracing::info!(
		appointment_id = appointment.id,
		dog_id,
		service_date = %appointment.appointment_date,
		customer_note_synced,
		"appointment picked up"
	);

	Ok(PickupOutcome {
		appointment,
		service_history: Some(history),
		customer_note_synced,
	})
}
