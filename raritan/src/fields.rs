/// One named per-outlet measurement.
///
/// Declaration order is significant: it is both the order fields are
/// requested from the device and the order returned values are distributed
/// back, so the two walks can never disagree on which value belongs to
/// which field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum SensorField {
	/// User-assigned outlet name.
	Label,
	/// Current draw, in milliamps.
	Current,
	/// Voltage, in millivolts.
	Voltage,
	/// Real power consumption, in Watts.
	ActivePower,
	/// Ratio of real to apparent power, as a percentage 0..=100.
	PowerFactor,
	/// The device's own cumulative active energy counter, in Watt-hours.
	/// Not reported by every unit.
	WattHours,
}

const BASE_FIELDS: &[SensorField] = &[
	SensorField::Label,
	SensorField::Current,
	SensorField::Voltage,
	SensorField::ActivePower,
	SensorField::PowerFactor,
];

const ENERGY_FIELDS: &[SensorField] = &[
	SensorField::Label,
	SensorField::Current,
	SensorField::Voltage,
	SensorField::ActivePower,
	SensorField::PowerFactor,
	SensorField::WattHours,
];

impl SensorField {
	/// The fixed field set for an outlet, by capability tier.
	pub fn for_capability(energy_support: bool) -> &'static [SensorField] {
		if energy_support {
			ENERGY_FIELDS
		} else {
			BASE_FIELDS
		}
	}

	/// Key used for the field in snapshots and configuration.
	pub const fn key(self) -> &'static str {
		match self {
			Self::Label => "label",
			Self::Current => "current",
			Self::Voltage => "voltage",
			Self::ActivePower => "active_power",
			Self::PowerFactor => "power_factor",
			Self::WattHours => "watt_hours",
		}
	}

	/// Object name of the field's column in the PDU MIB.
	///
	/// A static table rather than a derived title-casing of [`Self::key`];
	/// the names must match the MIB verbatim.
	pub const fn object(self) -> &'static str {
		match self {
			Self::Label => "outletLabel",
			Self::Current => "outletCurrent",
			Self::Voltage => "outletVoltage",
			Self::ActivePower => "outletActivePower",
			Self::PowerFactor => "outletPowerFactor",
			Self::WattHours => "outletWattHours",
		}
	}
}

#[cfg(test)]
mod tests {
	use super::SensorField;

	#[test]
	fn test_base_field_order() {
		assert_eq!(
			SensorField::for_capability(false),
			&[
				SensorField::Label,
				SensorField::Current,
				SensorField::Voltage,
				SensorField::ActivePower,
				SensorField::PowerFactor,
			]
		);
	}

	#[test]
	fn test_energy_tier_appends_watt_hours() {
		let fields = SensorField::for_capability(true);
		assert_eq!(fields.len(), 6);
		assert_eq!(fields.last(), Some(&SensorField::WattHours));
		assert_eq!(&fields[..5], SensorField::for_capability(false));
	}

	#[test]
	fn test_wire_object_names() {
		assert_eq!(SensorField::Label.object(), "outletLabel");
		assert_eq!(SensorField::Current.object(), "outletCurrent");
		assert_eq!(SensorField::Voltage.object(), "outletVoltage");
		assert_eq!(SensorField::ActivePower.object(), "outletActivePower");
		assert_eq!(SensorField::PowerFactor.object(), "outletPowerFactor");
		assert_eq!(SensorField::WattHours.object(), "outletWattHours");
	}
}
