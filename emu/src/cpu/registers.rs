/// Processor status byte, bit 7 to 0: `N V - B D I Z C`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Status(pub u8);

macro_rules! flag {
    ($get:ident, $set:ident, $mask:expr) => {
        pub fn $get(&self) -> bool {
            self.0 & $mask != 0
        }
        pub fn $set(&mut self, on: bool) {
            if on {
                self.0 |= $mask;
            } else {
                self.0 &= !$mask;
            }
        }
    };
}

impl Status {
    pub const C: u8 = 0x01;
    pub const Z: u8 = 0x02;
    pub const I: u8 = 0x04;
    pub const D: u8 = 0x08;
    pub const B: u8 = 0x10;
    pub const U: u8 = 0x20;
    pub const V: u8 = 0x40;
    pub const N: u8 = 0x80;

    flag!(c, set_c, Self::C);
    flag!(z, set_z, Self::Z);
    flag!(i, set_i, Self::I);
    flag!(d, set_d, Self::D);
    flag!(b, set_b, Self::B);
    flag!(v, set_v, Self::V);
    flag!(n, set_n, Self::N);

    /// Z and N from a result byte.
    pub fn set_zn(&mut self, value: u8) {
        self.set_z(value == 0);
        self.set_n(value & 0x80 != 0);
    }

    /// Name and value of every reported flag.
    pub fn named(&self) -> [(&'static str, bool); 7] {
        [
            ("C", self.c()),
            ("Z", self.z()),
            ("I", self.i()),
            ("D", self.d()),
            ("B", self.b()),
            ("V", self.v()),
            ("N", self.n()),
        ]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Registers {
    pub pc: u16,
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub s: u8,
    pub p: Status,
}
