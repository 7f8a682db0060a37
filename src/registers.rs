// src/registers.rs
//
// MAX2769 register map and the host-side shadow of it. The device is
// write-only, so `RegisterBank` is the only record of what it holds.

use crate::errors::FieldOverflowError;
use ufmt::{uDebug, uWrite};

/// Registers carry 28 significant bits.
pub const VALUE_MASK: u32 = 0x0FFF_FFFF;

// Register addresses
pub const CONF1_ADDR: u8 = 0b0000;
pub const CONF2_ADDR: u8 = 0b0001;
pub const CONF3_ADDR: u8 = 0b0010;
pub const PLLCONF_ADDR: u8 = 0b0011;
pub const PLLIDR_ADDR: u8 = 0b0100;
pub const FDIV_ADDR: u8 = 0b0101;
pub const STRM_ADDR: u8 = 0b0110;
pub const CFDR_ADDR: u8 = 0b0111;

// Power-on defaults
pub const CONF1_DEFAULT: u32 = 0xA29_19A3;
pub const CONF2_DEFAULT: u32 = 0x055_0288;
pub const CONF3_DEFAULT: u32 = 0xEAF_F1DC;
pub const PLLCONF_DEFAULT: u32 = 0x9EC_0008;
pub const PLLIDR_DEFAULT: u32 = 0x0C0_0080;
pub const FDIV_DEFAULT: u32 = 0x800_0070;
pub const STRM_DEFAULT: u32 = 0x800_0000;
pub const CFDR_DEFAULT: u32 = 0x100_61B2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Register {
    Conf1 = CONF1_ADDR,
    Conf2 = CONF2_ADDR,
    Conf3 = CONF3_ADDR,
    PllConf = PLLCONF_ADDR,
    PllIdr = PLLIDR_ADDR,
    Fdiv = FDIV_ADDR,
    Strm = STRM_ADDR,
    Cfdr = CFDR_ADDR,
}

impl Register {
    pub const ALL: [Register; 8] = [
        Register::Conf1,
        Register::Conf2,
        Register::Conf3,
        Register::PllConf,
        Register::PllIdr,
        Register::Fdiv,
        Register::Strm,
        Register::Cfdr,
    ];

    /// 4-bit wire address.
    pub const fn address(self) -> u8 {
        self as u8
    }

    pub const fn default_value(self) -> u32 {
        match self {
            Register::Conf1 => CONF1_DEFAULT,
            Register::Conf2 => CONF2_DEFAULT,
            Register::Conf3 => CONF3_DEFAULT,
            Register::PllConf => PLLCONF_DEFAULT,
            Register::PllIdr => PLLIDR_DEFAULT,
            Register::Fdiv => FDIV_DEFAULT,
            Register::Strm => STRM_DEFAULT,
            Register::Cfdr => CFDR_DEFAULT,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Register::Conf1 => "CONF1",
            Register::Conf2 => "CONF2",
            Register::Conf3 => "CONF3",
            Register::PllConf => "PLLCONF",
            Register::PllIdr => "PLLIDR",
            Register::Fdiv => "FDIV",
            Register::Strm => "STRM",
            Register::Cfdr => "CFDR",
        }
    }

    /// Field table for this register.
    pub const fn fields(self) -> &'static [Field] {
        match self {
            Register::Conf1 => conf1::FIELDS,
            Register::Conf2 => conf2::FIELDS,
            Register::Conf3 => conf3::FIELDS,
            Register::PllConf => pllconf::FIELDS,
            Register::PllIdr => pllidr::FIELDS,
            Register::Fdiv => fdiv::FIELDS,
            Register::Strm => strm::FIELDS,
            Register::Cfdr => cfdr::FIELDS,
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl uDebug for Register {
    fn fmt<W>(&self, f: &mut ufmt::Formatter<W>) -> core::result::Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        f.write_str(self.name())
    }
}

/// A named bit range inside a register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub offset: u8,
    pub width: u8,
}

impl Field {
    pub const fn new(name: &'static str, offset: u8, width: u8) -> Self {
        Field { name, offset, width }
    }

    /// Largest value the field can hold.
    pub const fn max_value(&self) -> u32 {
        (1u32 << self.width) - 1
    }

    /// Field bits in register position.
    pub const fn mask(&self) -> u32 {
        self.max_value() << self.offset
    }

    pub const fn extract(&self, register_value: u32) -> u32 {
        (register_value & self.mask()) >> self.offset
    }

    /// Power-on value of this field inside `register`.
    pub const fn default_for(&self, register: Register) -> u32 {
        self.extract(register.default_value())
    }

    /// Returns `register_value` with this field replaced by `value`.
    pub fn insert(&self, register_value: u32, value: u32) -> Result<u32, FieldOverflowError> {
        if value > self.max_value() {
            return Err(FieldOverflowError {
                field: self.name,
                value,
                width: self.width,
            });
        }
        Ok((register_value & !self.mask()) | (value << self.offset))
    }
}

/* CONF1 */
pub mod conf1 {
    use super::Field;

    pub const CHIPEN: Field = Field::new("CHIPEN", 27, 1);       // Chip enable
    pub const IDLE: Field = Field::new("IDLE", 26, 1);           // Idle enable
    pub const ILNA1: Field = Field::new("ILNA1", 22, 4);         // LNA1 current
    pub const ILNA2: Field = Field::new("ILNA2", 20, 2);         // LNA2 current
    pub const ILO: Field = Field::new("ILO", 18, 2);             // LO buffer current
    pub const IMIX: Field = Field::new("IMIX", 16, 2);           // Mixer current
    pub const MIXPOLE: Field = Field::new("MIXPOLE", 15, 1);     // Mixer pole selection
    pub const LNAMODE: Field = Field::new("LNAMODE", 13, 2);     // LNA mode select
    pub const MIXEN: Field = Field::new("MIXEN", 12, 1);         // Mixer enable
    pub const ANTEN: Field = Field::new("ANTEN", 11, 1);         // Antenna bias enable
    pub const FCEN: Field = Field::new("FCEN", 5, 6);            // IF center frequency
    pub const FBW: Field = Field::new("FBW", 3, 2);              // IF filter bandwidth
    pub const F3OR5: Field = Field::new("F3OR5", 2, 1);          // Filter order select
    pub const FCENX: Field = Field::new("FCENX", 1, 1);          // Polyphase filter select
    pub const FGAIN: Field = Field::new("FGAIN", 0, 1);          // IF filter gain select

    pub const FIELDS: &[Field] = &[
        CHIPEN, IDLE, ILNA1, ILNA2, ILO, IMIX, MIXPOLE, LNAMODE, MIXEN, ANTEN, FCEN, FBW, F3OR5,
        FCENX, FGAIN,
    ];
}

/* CONF2 */
pub mod conf2 {
    use super::Field;

    pub const IQEN: Field = Field::new("IQEN", 27, 1);           // I and Q channels enable
    pub const GAINREF: Field = Field::new("GAINREF", 15, 12);    // AGC gain reference
    pub const AGCMODE: Field = Field::new("AGCMODE", 11, 2);     // AGC mode
    pub const FORMAT: Field = Field::new("FORMAT", 9, 2);        // Output data format
    pub const BITS: Field = Field::new("BITS", 6, 3);            // Number of ADC bits
    pub const DRVCFG: Field = Field::new("DRVCFG", 4, 2);        // Output driver configuration
    pub const LOEN: Field = Field::new("LOEN", 3, 1);            // LO buffer enable
    pub const DIEID: Field = Field::new("DIEID", 0, 2);          // Die version

    pub const FIELDS: &[Field] = &[IQEN, GAINREF, AGCMODE, FORMAT, BITS, DRVCFG, LOEN, DIEID];
}

/* CONF3 */
pub mod conf3 {
    use super::Field;

    pub const GAININ: Field = Field::new("GAININ", 22, 6);       // PGA gain
    pub const FSLOWEN: Field = Field::new("FSLOWEN", 21, 1);     // Low ADC full-scale
    pub const HILOADEN: Field = Field::new("HILOADEN", 20, 1);   // Output driver high-load
    pub const ADCEN: Field = Field::new("ADCEN", 19, 1);         // ADC enable
    pub const DRVEN: Field = Field::new("DRVEN", 18, 1);         // Output driver enable
    pub const FOFSTEN: Field = Field::new("FOFSTEN", 17, 1);     // Filter DC offset cancellation
    pub const FILTEN: Field = Field::new("FILTEN", 16, 1);       // IF filter enable
    pub const FHIPEN: Field = Field::new("FHIPEN", 15, 1);       // Highpass coupling enable
    pub const PGAIEN: Field = Field::new("PGAIEN", 13, 1);       // I-channel PGA enable
    pub const PGAQEN: Field = Field::new("PGAQEN", 12, 1);       // Q-channel PGA enable
    pub const STRMEN: Field = Field::new("STRMEN", 11, 1);       // DSP interface enable
    pub const STRMSTART: Field = Field::new("STRMSTART", 10, 1);
    pub const STRMSTOP: Field = Field::new("STRMSTOP", 9, 1);
    pub const STRMCOUNT: Field = Field::new("STRMCOUNT", 6, 3);
    pub const STRMBITS: Field = Field::new("STRMBITS", 4, 2);
    pub const STAMPEN: Field = Field::new("STAMPEN", 3, 1);
    pub const TIMESYNCEN: Field = Field::new("TIMESYNCEN", 2, 1);
    pub const DATSYNCEN: Field = Field::new("DATSYNCEN", 1, 1);
    pub const STRMRST: Field = Field::new("STRMRST", 0, 1);

    pub const FIELDS: &[Field] = &[
        GAININ, FSLOWEN, HILOADEN, ADCEN, DRVEN, FOFSTEN, FILTEN, FHIPEN, PGAIEN, PGAQEN, STRMEN,
        STRMSTART, STRMSTOP, STRMCOUNT, STRMBITS, STAMPEN, TIMESYNCEN, DATSYNCEN, STRMRST,
    ];
}

/* PLLCONF */
pub mod pllconf {
    use super::Field;

    pub const VCOEN: Field = Field::new("VCOEN", 27, 1);         // VCO enable
    pub const IVCO: Field = Field::new("IVCO", 26, 1);           // VCO current select
    pub const REFOUTEN: Field = Field::new("REFOUTEN", 24, 1);   // Clock buffer enable
    pub const REFDIV: Field = Field::new("REFDIV", 21, 2);       // Clock output divider ratio
    pub const IXTAL: Field = Field::new("IXTAL", 19, 2);         // XTAL current
    pub const XTALCAP: Field = Field::new("XTALCAP", 14, 5);     // XTAL load cap
    pub const LDMUX: Field = Field::new("LDMUX", 10, 4);         // LD pin output select
    pub const ICP: Field = Field::new("ICP", 9, 1);              // Charge pump current
    pub const PFDEN: Field = Field::new("PFDEN", 8, 1);
    pub const CPTEST: Field = Field::new("CPTEST", 4, 3);        // Charge pump test
    pub const INT_PLL: Field = Field::new("INT_PLL", 3, 1);      // Integer PLL mode
    pub const PWRSAV: Field = Field::new("PWRSAV", 2, 1);        // PLL power save

    pub const FIELDS: &[Field] = &[
        VCOEN, IVCO, REFOUTEN, REFDIV, IXTAL, XTALCAP, LDMUX, ICP, PFDEN, CPTEST, INT_PLL, PWRSAV,
    ];
}

/* PLLIDR */
pub mod pllidr {
    use super::Field;

    pub const NDIV: Field = Field::new("NDIV", 13, 15);          // PLL integer division ratio
    pub const RDIV: Field = Field::new("RDIV", 3, 10);           // PLL reference division ratio

    pub const FIELDS: &[Field] = &[NDIV, RDIV];
}

/* FDIV */
pub mod fdiv {
    use super::Field;

    pub const FDIV: Field = Field::new("FDIV", 8, 20);           // PLL fractional division ratio

    pub const FIELDS: &[Field] = &[FDIV];
}

/* STRM */
pub mod strm {
    use super::Field;

    pub const FRAMECOUNT: Field = Field::new("FRAMECOUNT", 0, 28);

    pub const FIELDS: &[Field] = &[FRAMECOUNT];
}

/* CFDR */
pub mod cfdr {
    use super::Field;

    pub const L_CNT: Field = Field::new("L_CNT", 16, 12);        // L counter
    pub const M_CNT: Field = Field::new("M_CNT", 4, 12);         // M counter
    pub const FCLKIN: Field = Field::new("FCLKIN", 3, 1);        // Fractional clock divider
    pub const ADCCLK: Field = Field::new("ADCCLK", 2, 1);        // ADC clock selection
    pub const SERCLK: Field = Field::new("SERCLK", 1, 1);        // Serializer clock selection
    pub const MODE: Field = Field::new("MODE", 0, 1);            // DSP interface mode

    pub const FIELDS: &[Field] = &[L_CNT, M_CNT, FCLKIN, ADCCLK, SERCLK, MODE];
}

/// Host copy of every device register.
///
/// Holds the value last transmitted for each register since the device
/// was powered up. Nothing here touches the bus.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisterBank {
    values: [u32; 8],
}

impl Default for RegisterBank {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterBank {
    pub fn new() -> Self {
        let mut bank = RegisterBank { values: [0; 8] };
        bank.reset();
        bank
    }

    /// Back to power-on defaults. Needed after every power cycle.
    pub fn reset(&mut self) {
        for register in Register::ALL {
            self.values[register.index()] = register.default_value();
        }
    }

    pub fn get(&self, register: Register) -> u32 {
        self.values[register.index()]
    }

    /// Replaces `field` inside `register` and returns the new register value.
    /// On overflow the shadow is left as it was.
    pub fn set_field(
        &mut self,
        register: Register,
        field: Field,
        value: u32,
    ) -> Result<u32, FieldOverflowError> {
        let updated = field.insert(self.get(register), value)?;
        self.values[register.index()] = updated;
        Ok(updated)
    }

    pub fn field(&self, register: Register, field: Field) -> u32 {
        field.extract(self.get(register))
    }

    pub(crate) fn store(&mut self, register: Register, value: u32) {
        self.values[register.index()] = value & VALUE_MASK;
    }
}
