//! Source wiring validation.

use crate::error::{LabError, Result, WiringFault};

use super::{Circuit, ComponentId, Terminal};

/// Check that a battery can drive a tick.
///
/// Checks:
/// - Both terminals are on a wire
/// - The terminals are on different wires (the battery is not shorted)
///
/// Runs before path discovery so floating or shorted sources never reach
/// the traversal.
pub fn validate_source_wiring(circuit: &Circuit, source: ComponentId) -> Result<()> {
    let battery = circuit
        .component(source)
        .ok_or(LabError::ComponentNotFound { id: source })?;

    let fault = match (
        circuit.terminal_wire(source, Terminal::Start),
        circuit.terminal_wire(source, Terminal::End),
    ) {
        (None, _) => Some(WiringFault::StartUnwired),
        (_, None) => Some(WiringFault::EndUnwired),
        (Some(start), Some(end)) if start == end => Some(WiringFault::SharedWire),
        _ => None,
    };

    match fault {
        Some(fault) => Err(LabError::InvalidSourceWiring {
            name: battery.name.clone(),
            fault,
        }),
        None => Ok(()),
    }
}
