use crate::error::SnmpError;

// Object prefixes transcribed from SNMPv2-MIB and the Raritan PDU-MIB
// (Dominion PX). The instance -- 0 for scalars, the outlet number for table
// columns -- is appended by resolve().
const OBJECTS: &[(&str, &str, &[u64])] = &[
	("SNMPv2-MIB", "sysDescr", &[1, 3, 6, 1, 2, 1, 1, 1]),
	("SNMPv2-MIB", "sysName", &[1, 3, 6, 1, 2, 1, 1, 5]),
	("PDU-MIB", "unitCpuTemp", &[1, 3, 6, 1, 4, 1, 13742, 4, 1, 1, 9]),
	("PDU-MIB", "outletCount", &[1, 3, 6, 1, 4, 1, 13742, 4, 1, 2, 1]),
	("PDU-MIB", "outletEnergySupport", &[1, 3, 6, 1, 4, 1, 13742, 4, 1, 2, 3]),
	("PDU-MIB", "outletLabel", &[1, 3, 6, 1, 4, 1, 13742, 4, 1, 2, 2, 1, 2]),
	("PDU-MIB", "outletCurrent", &[1, 3, 6, 1, 4, 1, 13742, 4, 1, 2, 2, 1, 4]),
	("PDU-MIB", "outletVoltage", &[1, 3, 6, 1, 4, 1, 13742, 4, 1, 2, 2, 1, 6]),
	("PDU-MIB", "outletActivePower", &[1, 3, 6, 1, 4, 1, 13742, 4, 1, 2, 2, 1, 7]),
	("PDU-MIB", "outletPowerFactor", &[1, 3, 6, 1, 4, 1, 13742, 4, 1, 2, 2, 1, 9]),
	("PDU-MIB", "outletWattHours", &[1, 3, 6, 1, 4, 1, 13742, 4, 1, 2, 2, 1, 31]),
];

/// Resolves a (module, object, instance) triple to the numeric arcs of its
/// object identifier. Unknown objects fail the whole batch they belong to.
pub(crate) fn resolve(module: &str, object: &str, instance: u32) -> Result<Vec<u64>, SnmpError> {
	let Some((_, _, prefix)) = OBJECTS
		.iter()
		.find(|(known_module, known_object, _)| *known_module == module && *known_object == object)
	else {
		return Err(SnmpError::UnknownObject {
			module: module.to_owned(),
			object: object.to_owned(),
		});
	};

	let mut arcs = Vec::with_capacity(prefix.len() + 1);
	arcs.extend_from_slice(prefix);
	arcs.push(instance.into());
	Ok(arcs)
}

#[cfg(test)]
mod tests {
	use super::{resolve, OBJECTS};
	use crate::error::SnmpError;

	#[test]
	fn test_scalar_resolution() {
		let arcs = resolve("SNMPv2-MIB", "sysDescr", 0).unwrap();
		assert_eq!(arcs, [1, 3, 6, 1, 2, 1, 1, 1, 0]);
	}

	#[test]
	fn test_instance_addresses_the_table_row() {
		let arcs = resolve("PDU-MIB", "outletActivePower", 4).unwrap();
		assert_eq!(arcs, [1, 3, 6, 1, 4, 1, 13742, 4, 1, 2, 2, 1, 7, 4]);
	}

	#[test]
	fn test_unknown_object_is_an_error() {
		assert!(matches!(
			resolve("PDU-MIB", "outletApparentPower", 1),
			Err(SnmpError::UnknownObject { .. })
		));
		assert!(matches!(
			resolve("IF-MIB", "sysDescr", 0),
			Err(SnmpError::UnknownObject { .. })
		));
	}

	#[test]
	fn test_table_has_no_duplicate_names() {
		for (position, (module, object, _)) in OBJECTS.iter().enumerate() {
			let duplicates = OBJECTS
				.iter()
				.skip(position + 1)
				.filter(|(other_module, other_object, _)| {
					other_module == module && other_object == object
				})
				.count();
			assert_eq!(duplicates, 0, "{module}::{object} declared twice");
		}
	}
}
