// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory stand-in for the Emscripten module, for the web binding tests.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

use async_trait::async_trait;

use nativelouis_core::types::Direction;

use super::{REQUIRED_EXPORTS, WasmLoader, WasmRuntime};

#[derive(Default)]
struct State {
    responses: RefCell<HashMap<(String, String), String>>,
    missing_exports: RefCell<Vec<String>>,
    mount: RefCell<Vec<String>>,
    log_level_fails: Cell<bool>,
    throw_on_translate: Cell<bool>,
    set_value_fails: Cell<bool>,
    get_value_fails: Cell<bool>,
    memory: RefCell<Vec<u8>>,
    next_ptr: Cell<u32>,
    live: RefCell<BTreeSet<u32>>,
    instantiations: Cell<usize>,
    log_levels: RefCell<Vec<i32>>,
    directions: RefCell<Vec<Direction>>,
    last_out_capacity: Cell<Option<usize>>,
}

/// Shared handle: the loader hands out clones, the test inspects the state.
#[derive(Clone)]
pub(crate) struct MockRuntime {
    state: Rc<State>,
}

impl MockRuntime {
    pub(crate) fn new() -> Self {
        let state = State::default();
        state.next_ptr.set(8);
        state
            .mount
            .replace(vec![".".into(), "..".into(), "en-ueb-g1.ctb".into()]);
        Self {
            state: Rc::new(state),
        }
    }

    pub(crate) fn respond(self, input: &str, tables: &str, output: &str) -> Self {
        self.state
            .responses
            .borrow_mut()
            .insert((input.into(), tables.into()), output.into());
        self
    }

    pub(crate) fn without_export(self, name: &str) -> Self {
        self.state.missing_exports.borrow_mut().push(name.into());
        self
    }

    pub(crate) fn with_mount(self, entries: &[&str]) -> Self {
        self.state
            .mount
            .replace(entries.iter().map(|e| e.to_string()).collect());
        self
    }

    pub(crate) fn failing_log_level(self) -> Self {
        self.state.log_level_fails.set(true);
        self
    }

    pub(crate) fn throwing(self) -> Self {
        self.state.throw_on_translate.set(true);
        self
    }

    pub(crate) fn failing_set_value(self) -> Self {
        self.state.set_value_fails.set(true);
        self
    }

    pub(crate) fn failing_get_value(self) -> Self {
        self.state.get_value_fails.set(true);
        self
    }

    pub(crate) fn instantiations(&self) -> usize {
        self.state.instantiations.get()
    }

    pub(crate) fn live_allocations(&self) -> usize {
        self.state.live.borrow().len()
    }

    pub(crate) fn log_levels(&self) -> Vec<i32> {
        self.state.log_levels.borrow().clone()
    }

    pub(crate) fn directions(&self) -> Vec<Direction> {
        self.state.directions.borrow().clone()
    }

    pub(crate) fn translate_calls(&self) -> usize {
        self.state.directions.borrow().len()
    }

    pub(crate) fn last_out_capacity(&self) -> Option<usize> {
        self.state.last_out_capacity.get()
    }

    fn write(&self, ptr: u32, bytes: &[u8]) {
        let start = ptr as usize;
        self.state.memory.borrow_mut()[start..start + bytes.len()].copy_from_slice(bytes);
    }

    fn read<const N: usize>(&self, ptr: u32) -> [u8; N] {
        let start = ptr as usize;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.state.memory.borrow()[start..start + N]);
        out
    }

    fn read_i32(&self, ptr: u32) -> i32 {
        i32::from_le_bytes(self.read(ptr))
    }

    fn read_u16(&self, ptr: u32) -> u16 {
        u16::from_le_bytes(self.read(ptr))
    }

    fn setter(&self) -> Result<(), String> {
        if self.state.set_value_fails.get() {
            return Err("RangeError: invalid typed array length".into());
        }
        Ok(())
    }

    fn getter(&self) -> Result<(), String> {
        if self.state.get_value_fails.get() {
            return Err("RuntimeError: memory access out of bounds".into());
        }
        Ok(())
    }

    fn read_c_string(&self, ptr: u32) -> String {
        let memory = self.state.memory.borrow();
        let start = ptr as usize;
        let end = memory[start..]
            .iter()
            .position(|b| *b == 0)
            .map_or(memory.len(), |n| start + n);
        String::from_utf8_lossy(&memory[start..end]).into_owned()
    }
}

impl WasmRuntime for MockRuntime {
    fn has_export(&self, name: &str) -> bool {
        REQUIRED_EXPORTS.contains(&name)
            && !self.state.missing_exports.borrow().iter().any(|m| m == name)
    }

    fn read_dir(&self, _path: &str) -> Result<Vec<String>, String> {
        Ok(self.state.mount.borrow().clone())
    }

    fn malloc(&self, bytes: u32) -> Result<u32, String> {
        let ptr = self.state.next_ptr.get();
        let next = ptr + bytes.max(1).div_ceil(8) * 8;
        self.state.next_ptr.set(next);
        self.state.memory.borrow_mut().resize(next as usize, 0);
        self.state.live.borrow_mut().insert(ptr);
        Ok(ptr)
    }

    fn free(&self, ptr: u32) {
        assert!(self.state.live.borrow_mut().remove(&ptr), "double free of {ptr}");
    }

    fn set_i32(&self, ptr: u32, value: i32) -> Result<(), String> {
        self.setter()?;
        self.write(ptr, &value.to_le_bytes());
        Ok(())
    }

    fn get_i32(&self, ptr: u32) -> Result<i32, String> {
        self.getter()?;
        Ok(self.read_i32(ptr))
    }

    fn set_u16(&self, ptr: u32, value: u16) -> Result<(), String> {
        self.setter()?;
        self.write(ptr, &value.to_le_bytes());
        Ok(())
    }

    fn get_u16(&self, ptr: u32) -> Result<u16, String> {
        self.getter()?;
        Ok(self.read_u16(ptr))
    }

    fn alloc_utf8(&self, text: &str) -> Result<u32, String> {
        let len = u32::try_from(text.len() + 1).map_err(|e| e.to_string())?;
        let ptr = self.malloc(len)?;
        self.write(ptr, text.as_bytes());
        self.write(ptr + len - 1, &[0]);
        Ok(ptr)
    }

    fn call_translate(&self, direction: Direction, args: [u32; 8]) -> Result<i32, String> {
        self.state.directions.borrow_mut().push(direction);
        if self.state.throw_on_translate.get() {
            return Err("RuntimeError: memory access out of bounds".into());
        }

        let [table, in_buf, in_len, out_buf, out_len, ..] = args;
        let tables = self.read_c_string(table);
        let supplied = usize::try_from(self.read_i32(in_len)).unwrap();
        let units: Vec<u16> = (0..supplied)
            .map(|i| self.read_u16(in_buf + 2 * i as u32))
            .collect();
        assert_eq!(
            self.read_u16(in_buf + 2 * supplied as u32),
            0,
            "input not NUL terminated"
        );
        let input = String::from_utf16(&units).unwrap();
        let capacity = usize::try_from(self.read_i32(out_len)).unwrap();
        self.state.last_out_capacity.set(Some(capacity));

        if input.is_empty() {
            self.write(out_len, &0i32.to_le_bytes());
            return Ok(1);
        }
        let answer = self.state.responses.borrow().get(&(input, tables)).cloned();
        match answer {
            Some(answer) => {
                let out: Vec<u16> = answer.encode_utf16().take(capacity).collect();
                for (i, unit) in out.iter().enumerate() {
                    self.write(out_buf + 2 * i as u32, &unit.to_le_bytes());
                }
                let written = i32::try_from(out.len()).unwrap();
                self.write(out_len, &written.to_le_bytes());
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn set_log_level(&self, level: i32) -> Result<(), String> {
        if self.state.log_level_fails.get() {
            return Err("TypeError: lou_setLogLevel is not a function".into());
        }
        self.state.log_levels.borrow_mut().push(level);
        Ok(())
    }
}

/// Loader that hands out the shared mock runtime.
pub(crate) struct MockLoader {
    runtime: MockRuntime,
    failure: Option<String>,
}

impl MockLoader {
    pub(crate) fn new(runtime: &MockRuntime) -> Self {
        Self {
            runtime: runtime.clone(),
            failure: None,
        }
    }

    pub(crate) fn failing(runtime: &MockRuntime, message: &str) -> Self {
        Self {
            runtime: runtime.clone(),
            failure: Some(message.into()),
        }
    }
}

#[async_trait(?Send)]
impl WasmLoader for MockLoader {
    async fn instantiate(&self) -> Result<Box<dyn WasmRuntime>, String> {
        let state = &self.runtime.state;
        state.instantiations.set(state.instantiations.get() + 1);
        // Suspend so concurrent initializers overlap with this one.
        tokio::task::yield_now().await;
        match &self.failure {
            Some(message) => Err(message.clone()),
            None => Ok(Box::new(self.runtime.clone())),
        }
    }
}
