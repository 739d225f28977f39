//! Address and size resolution.
//!
//! Every instruction starts anywhere in memory with a size somewhere in the
//! range its kind allows. Repeated passes over the program narrow the label
//! intervals until nothing changes, then the addressing modes are chosen,
//! sizes become exact and a second fixpoint pins every address down.

use arch::{opcode, AddressingMode, InstrKind};

use crate::addressing::determine_addressing_mode;
use crate::error::{At, Diag, Error, Location};
use crate::expr::ExprRef;
use crate::label::Labels;
use crate::line::{Instruction, SourceFile};
use crate::range::{evaluate, Interval};

#[derive(Debug, Default)]
pub struct LayoutEngine {
    labels: Labels,
    start: Option<(ExprRef, Location)>,
    passes: (usize, usize),
    trace: Option<Vec<Vec<(String, Interval)>>>,
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a snapshot of the label table after every fixpoint pass.
    pub fn tracing() -> Self {
        LayoutEngine {
            trace: Some(vec![]),
            ..Self::default()
        }
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    /// Passes taken by the address fixpoint and by the size fixpoint.
    pub fn passes(&self) -> (usize, usize) {
        self.passes
    }

    pub fn trace(&self) -> &[Vec<(String, Interval)>] {
        self.trace.as_deref().unwrap_or(&[])
    }

    /// Runs every pass and returns the start address.
    pub fn run(&mut self, files: &mut [SourceFile]) -> Result<u16, Diag> {
        self.discover(files)?;
        self.settle(files)
    }

    /// Runs the passes after discovery again on an already laid out program.
    pub fn settle(&mut self, files: &mut [SourceFile]) -> Result<u16, Diag> {
        self.passes.0 = self.fixpoint(files, Self::address_pass)?;
        self.resolve_modes(files)?;
        self.resolve_sizes(files)?;
        self.passes.1 = self.fixpoint(files, Self::size_pass)?;
        self.finalize(files)?;
        self.emit(files)?;
        self.resolve_start()
    }

    // ------------------------------------------------------------------------
    // 1. Discovery

    fn discover(&mut self, files: &mut [SourceFile]) -> Result<(), Diag> {
        self.labels = Labels::new();
        self.start = None;

        for file in files.iter_mut() {
            for line in file.lines.iter_mut() {
                let Some(inst) = &mut line.inst else {
                    continue;
                };
                if inst.kind == InstrKind::START {
                    if let Some(operand) = inst.operand.clone() {
                        self.start = Some((operand, inst.location.clone()));
                    }
                    line.inst = None;
                    continue;
                }

                let (lo, hi) = inst.kind.size_range();
                inst.address_range = Interval::UNKNOWN;
                inst.size_range = Interval::new(lo, hi);
                inst.address = 0;
                inst.size = 0;
                inst.mode = None;
                inst.param = None;
                inst.bytes.clear();

                if let Some(label) = &inst.label {
                    if self.labels.insert(label.clone(), inst.location.clone()).is_some() {
                        return Err(Error::DuplicateLabel(label.clone())).at(&inst.location);
                    }
                }
            }
        }

        // Every referenced label must be defined somewhere
        let operands = files
            .iter()
            .flat_map(|file| file.instructions())
            .filter_map(|inst| inst.operand.as_ref().map(|e| (e, &inst.location)))
            .chain(self.start.as_ref().map(|(e, loc)| (e, loc)));
        for (expr, location) in operands {
            if let Some(name) = expr.labels().into_iter().find(|l| !self.labels.contains(l)) {
                return Err(Error::UnresolvedLabel(name.to_string())).at(location);
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // 2. / 4. Fixpoints

    fn fixpoint(
        &mut self,
        files: &mut [SourceFile],
        pass: fn(&mut Self, &mut [SourceFile]) -> Result<bool, Diag>,
    ) -> Result<usize, Diag> {
        let count = files.iter().map(|f| f.instructions().count()).sum::<usize>();
        let limit = 4 * count + 16;
        for passes in 1..=limit {
            let changed = pass(self, files)?;
            if let Some(trace) = &mut self.trace {
                trace.push(
                    self.labels
                        .iter()
                        .map(|(name, range)| (name.clone(), *range))
                        .collect(),
                );
            }
            if !changed {
                return Ok(passes);
            }
        }
        Err(Error::LayoutDiverged(limit).into())
    }

    /// Places every instruction using its size range.
    fn address_pass(&mut self, files: &mut [SourceFile]) -> Result<bool, Diag> {
        let mut changed = false;
        let mut cur = Interval::point(0);
        for inst in files.iter_mut().flat_map(|f| f.instructions_mut()) {
            if inst.kind == InstrKind::BASE {
                cur = self.base(inst)?;
                changed |= inst.address_range != cur;
                inst.address_range = cur;
                continue;
            }
            changed |= self.place(inst, cur);
            cur = cur + inst.size_range;
        }
        Ok(changed)
    }

    /// Places every instruction using its exact size. DATA widths are
    /// decided here since they depend on the value they carry.
    fn size_pass(&mut self, files: &mut [SourceFile]) -> Result<bool, Diag> {
        let mut changed = false;
        let mut cur = Interval::point(0);
        for inst in files.iter_mut().flat_map(|f| f.instructions_mut()) {
            match inst.kind {
                InstrKind::BASE => {
                    cur = self.base(inst)?;
                    changed |= inst.address_range != cur;
                    inst.address_range = cur;
                }
                InstrKind::DATA => {
                    changed |= self.place(inst, cur);
                    let value = self.operand_range(inst)?;
                    if !value.within(0x0000, 0xFFFF) {
                        return Err(Error::DataOutOfRange(value.lo, value.hi)).at(&inst.location);
                    }
                    let width = |v: i64| if v < 0x100 { 1 } else { 2 };
                    let size_range = Interval::new(width(value.lo), width(value.hi));
                    changed |= inst.size_range != size_range;
                    inst.size_range = size_range;
                    if size_range.is_point() {
                        inst.size = size_range.lo as usize;
                    }
                    cur = cur + size_range;
                }
                _ => {
                    changed |= self.place(inst, cur);
                    cur = cur + Interval::point(inst.size as i64);
                }
            }
        }
        Ok(changed)
    }

    fn base(&self, inst: &Instruction) -> Result<Interval, Diag> {
        let operand = inst.operand.as_ref().ok_or(Error::MissingBaseOperand).at(&inst.location)?;
        evaluate(operand, &self.labels).at(&inst.location)
    }

    fn operand_range(&self, inst: &Instruction) -> Result<Interval, Diag> {
        let operand = inst.operand.as_ref().ok_or(Error::UnresolvedValue).at(&inst.location)?;
        evaluate(operand, &self.labels).at(&inst.location)
    }

    /// Stamps the cursor on an instruction and its label.
    fn place(&mut self, inst: &mut Instruction, cur: Interval) -> bool {
        let mut changed = inst.address_range != cur;
        inst.address_range = cur;
        if let Some(label) = &inst.label {
            changed |= self.labels.update(label, cur);
        }
        changed
    }

    // ------------------------------------------------------------------------
    // 3. Addressing modes

    fn resolve_modes(&mut self, files: &mut [SourceFile]) -> Result<(), Diag> {
        for inst in files.iter_mut().flat_map(|f| f.instructions_mut()) {
            if matches!(inst.kind, InstrKind::BASE | InstrKind::DATA) {
                continue;
            }
            let Some(operand) = &inst.operand else {
                continue;
            };
            let (mode, param) = determine_addressing_mode(operand, &self.labels).at(&inst.location)?;
            inst.mode = Some(mode);
            inst.param = param;
        }
        Ok(())
    }

    fn resolve_sizes(&mut self, files: &mut [SourceFile]) -> Result<(), Diag> {
        for inst in files.iter_mut().flat_map(|f| f.instructions_mut()) {
            match inst.kind {
                InstrKind::BASE => inst.size = 0,
                InstrKind::DATA => {}
                kind => {
                    let size = kind.size(inst.mode).ok_or_else(|| {
                        Error::UnsupportedAddressingModeForInstruction(
                            kind.to_string(),
                            mode_name(inst.mode),
                        )
                    });
                    inst.size = size.at(&inst.location)?;
                    inst.size_range = Interval::point(inst.size as i64);
                }
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // 5. Finalization

    /// BASE lines stay in place so the program can be settled again, but
    /// take no address and emit nothing.
    fn finalize(&mut self, files: &mut [SourceFile]) -> Result<(), Diag> {
        for inst in files.iter_mut().flat_map(|f| f.instructions_mut()) {
            if inst.kind == InstrKind::BASE {
                continue;
            }
            let Some(address) = inst.address_range.value() else {
                return Err(Error::UnresolvedAddress).at(&inst.location);
            };
            if !(0x0000..=0xFFFF).contains(&address) {
                return Err(Error::ValueOutOfRange(address, address)).at(&inst.location);
            }
            inst.address = address as u16;
        }
        Ok(())
    }

    fn emit(&mut self, files: &mut [SourceFile]) -> Result<(), Diag> {
        for inst in files.iter_mut().flat_map(|f| f.instructions_mut()) {
            inst.bytes = self.encode(inst).at(&inst.location)?;
        }
        Ok(())
    }

    fn encode(&self, inst: &Instruction) -> Result<Vec<u8>, Error> {
        let mut bytes = vec![];
        let param = match inst.kind {
            InstrKind::BASE => return Ok(bytes),
            InstrKind::DATA => inst.operand.as_ref(),
            kind => {
                let op = opcode::encode(kind, inst.mode).ok_or_else(|| {
                    Error::UnsupportedAddressingModeForInstruction(
                        kind.to_string(),
                        mode_name(inst.mode),
                    )
                })?;
                bytes.push(op);
                inst.param.as_ref()
            }
        };
        let Some(param) = param else {
            return Ok(bytes);
        };

        let value = evaluate(param, &self.labels)?
            .value()
            .ok_or(Error::UnresolvedValue)?;

        if inst.kind.is_branch() {
            let rel = value.saturating_sub(inst.address as i64 + 2);
            if !(-128..=127).contains(&rel) {
                return Err(Error::BranchOffsetOutOfRange(rel));
            }
            bytes.push(rel as u8);
            return Ok(bytes);
        }
        if !(0x0000..=0xFFFF).contains(&value) {
            return Err(Error::ValueOutOfRange(value, value));
        }

        let [lo, hi] = (value as u16).to_le_bytes();
        match (inst.kind, inst.size) {
            (InstrKind::DATA, _) if value < 0x100 => bytes.push(lo),
            (InstrKind::DATA, _) => bytes.extend([lo, hi]),
            (_, 2) if value < 0x100 => bytes.push(lo),
            (_, 2) => return Err(Error::SingleByteExpected(value)),
            _ => bytes.extend([lo, hi]),
        }
        Ok(bytes)
    }

    fn resolve_start(&self) -> Result<u16, Diag> {
        let Some((expr, location)) = &self.start else {
            return Err(Error::MissingStartDirective.into());
        };
        let start = evaluate(expr, &self.labels).at(location)?;
        match start.value() {
            Some(v) if (0x0000..=0xFFFF).contains(&v) => Ok(v as u16),
            _ => Err(Error::UnresolvedStart).at(location),
        }
    }
}

fn mode_name(mode: Option<AddressingMode>) -> String {
    mode.map(|m| m.to_string()).unwrap_or_else(|| "implied".to_string())
}
