//! WASM bindings for Circuit Lab.
//!
//! This module provides JavaScript-friendly bindings so a browser-based
//! schematic editor can solve its circuit on every edit.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmCircuitLab } from 'circuit_lab';
//!
//! await init();
//!
//! const lab = new WasmCircuitLab(`
//!   B1  plus minus 9V
//!   SW1 plus a     off
//!   L1  a    minus 30
//! `);
//!
//! lab.toggle_switch("SW1");
//! console.log(lab.tick());
//! console.log(lab.current("L1"));   // 0.3
//! ```

use wasm_bindgen::prelude::*;

use crate::circuit::Circuit;
use crate::components::Quantity;
use crate::dsl;
use crate::schematic;
use crate::solver::{SimulationConfig, Simulator, TickReport};

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// WASM-compatible schematic solver.
///
/// Wraps the native [`Simulator`] and keeps the report of the last tick.
#[wasm_bindgen]
pub struct WasmCircuitLab {
    simulator: Simulator,
    last: Option<TickReport>,
}

#[wasm_bindgen]
impl WasmCircuitLab {
    /// Create a lab from a schematic DSL string.
    ///
    /// # Example
    /// ```javascript
    /// const lab = new WasmCircuitLab("B1 p n 9\nR1 p n 100");
    /// ```
    #[wasm_bindgen(constructor)]
    pub fn new(schematic_dsl: &str) -> Result<WasmCircuitLab, JsValue> {
        Self::with_config(schematic_dsl, crate::solver::MAX_PASSES, crate::solver::TOLERANCE)
    }

    /// Create a lab with a custom pass bound and validation tolerance.
    #[wasm_bindgen]
    pub fn with_config(schematic_dsl: &str, max_passes: usize, tolerance: f64) -> Result<WasmCircuitLab, JsValue> {
        let ast = dsl::parse(schematic_dsl).map_err(js_error)?;
        let circuit = Circuit::from_ast(ast).map_err(js_error)?;
        let config = SimulationConfig::new()
            .with_max_passes(max_passes)
            .with_tolerance(tolerance);
        Ok(Self::from_circuit(circuit, config))
    }

    /// Create a lab from an exported JSON schematic.
    #[wasm_bindgen]
    pub fn from_json(json: &str) -> Result<WasmCircuitLab, JsValue> {
        let circuit = schematic::from_json(json).map_err(js_error)?;
        Ok(Self::from_circuit(circuit, SimulationConfig::default()))
    }

    fn from_circuit(circuit: Circuit, config: SimulationConfig) -> WasmCircuitLab {
        WasmCircuitLab {
            simulator: Simulator::with_config(circuit, config),
            last: None,
        }
    }

    /// Solve the schematic and return the text summary.
    #[wasm_bindgen]
    pub fn tick(&mut self) -> String {
        let report = self.simulator.tick();
        let summary = report.summary(self.simulator.circuit());
        self.last = Some(report);
        summary
    }

    /// Flip a switch by name. Returns the new state (`true` = closed).
    #[wasm_bindgen]
    pub fn toggle_switch(&mut self, name: &str) -> Result<bool, JsValue> {
        let circuit = self.simulator.circuit_mut();
        let id = circuit.id_of(name).map_err(js_error)?;
        circuit.toggle_switch(id).map_err(js_error)
    }

    /// Series/parallel structure found by the last tick, e.g. `B1, [R1 | R2], B1`.
    #[wasm_bindgen]
    pub fn tree_label(&self) -> String {
        match &self.last {
            Some(report) => report.tree.label(self.simulator.circuit()),
            None => String::new(),
        }
    }

    /// Warnings from the last tick, one per entry.
    #[wasm_bindgen]
    pub fn diagnostics(&self) -> Vec<String> {
        let circuit = self.simulator.circuit();
        self.last
            .iter()
            .flat_map(|report| report.diagnostics.iter().map(|d| d.describe(circuit)))
            .collect()
    }

    /// Stored voltage of a component, or `undefined`.
    #[wasm_bindgen]
    pub fn voltage(&self, name: &str) -> Option<f64> {
        self.value(name, Quantity::Voltage)
    }

    /// Stored current of a component, or `undefined`.
    #[wasm_bindgen]
    pub fn current(&self, name: &str) -> Option<f64> {
        self.value(name, Quantity::Current)
    }

    /// Stored resistance of a component, or `undefined`.
    #[wasm_bindgen]
    pub fn resistance(&self, name: &str) -> Option<f64> {
        self.value(name, Quantity::Resistance)
    }

    /// Stored power of a component, or `undefined`.
    #[wasm_bindgen]
    pub fn power(&self, name: &str) -> Option<f64> {
        self.value(name, Quantity::Power)
    }

    fn value(&self, name: &str, quantity: Quantity) -> Option<f64> {
        self.simulator
            .circuit()
            .find_by_name(name)
            .and_then(|c| c.values.get(quantity).get())
    }

    /// Export the schematic as JSON.
    #[wasm_bindgen]
    pub fn export_json(&self) -> Result<String, JsValue> {
        schematic::to_json(self.simulator.circuit()).map_err(js_error)
    }
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
