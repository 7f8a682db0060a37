// src/profile.rs
//
// Named front-end settings and the register fields they land in.

use ufmt::derive::uDebug;

use crate::registers::{conf1, conf2, conf3, pllconf, Field, Register};

/// Clock output divider applied to the crystal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, uDebug)]
pub enum ReferenceDivider {
    /// XTAL / 4 (16.368 MHz -> 4.092 MHz)
    Quarter,
    /// XTAL / 2
    Half,
}

impl ReferenceDivider {
    pub const fn code(self) -> u32 {
        // 00: x2, 01: /4, 10: /2, 11: x1
        match self {
            ReferenceDivider::Quarter => 0b01,
            ReferenceDivider::Half => 0b10,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, uDebug)]
pub enum AdcResolution {
    OneBit,
    TwoBit,
}

impl AdcResolution {
    pub const fn code(self) -> u32 {
        // 000: 1 bit, 001: 1.5 bits, 010: 2 bits, 011: 2.5 bits, 100: 3 bits
        match self {
            AdcResolution::OneBit => 0b000,
            AdcResolution::TwoBit => 0b010,
        }
    }

    pub const fn bits_per_sample(self) -> u8 {
        match self {
            AdcResolution::OneBit => 1,
            AdcResolution::TwoBit => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, uDebug)]
pub enum Current {
    Normal,
    Reduced,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, uDebug)]
pub enum FilterOrder {
    Third,
    Fifth,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, uDebug)]
pub enum AntennaBias {
    Enabled,
    Disabled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, uDebug)]
pub enum IqChannels {
    IOnly,
    IAndQ,
}

/// Which LNA is in the signal path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, uDebug)]
pub enum LnaMode {
    /// Chosen by the antenna bias circuit
    Gated,
    Lna2,
    Lna1,
    Off,
}

impl LnaMode {
    pub const fn code(self) -> u32 {
        match self {
            LnaMode::Gated => 0b00,
            LnaMode::Lna2 => 0b01,
            LnaMode::Lna1 => 0b10,
            LnaMode::Off => 0b11,
        }
    }
}

// Reduced-current codes
const ILNA1_REDUCED: u32 = 0b0010;
const ILNA2_REDUCED: u32 = 0b00;
const ILO_REDUCED: u32 = 0b00;
const IMIX_REDUCED: u32 = 0b00;

/// One field assignment produced by a profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldWrite {
    pub register: Register,
    pub field: Field,
    pub value: u32,
}

impl FieldWrite {
    const fn new(register: Register, field: Field, value: u32) -> Self {
        FieldWrite { register, field, value }
    }

    /// Writes the field's power-on value.
    const fn power_on(register: Register, field: Field) -> Self {
        FieldWrite::new(register, field, field.default_for(register))
    }
}

/// A complete front-end configuration.
///
/// The divider and ADC resolution are always written. Every other setting
/// is only written when it is `Some`; `None` leaves the register alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Profile {
    pub reference_divider: ReferenceDivider,
    pub adc_resolution: AdcResolution,
    pub lna_current: Option<Current>,
    pub lo_current: Option<Current>,
    pub mixer_current: Option<Current>,
    pub filter_order: Option<FilterOrder>,
    pub antenna_bias: Option<AntennaBias>,
    pub lna_mode: Option<LnaMode>,
    pub vco_current: Option<Current>,
    pub pll_power: Option<Current>,
    pub iq_channels: Option<IqChannels>,
}

impl Default for Profile {
    fn default() -> Self {
        Self::new(ReferenceDivider::Quarter, AdcResolution::OneBit)
    }
}

impl Profile {
    pub const fn new(reference_divider: ReferenceDivider, adc_resolution: AdcResolution) -> Self {
        Profile {
            reference_divider,
            adc_resolution,
            lna_current: None,
            lo_current: None,
            mixer_current: None,
            filter_order: None,
            antenna_bias: None,
            lna_mode: None,
            vco_current: None,
            pll_power: None,
            iq_channels: None,
        }
    }

    /// Every current trim reduced, 3rd order filter, no antenna bias.
    pub const fn low_power(reference_divider: ReferenceDivider, adc_resolution: AdcResolution) -> Self {
        Profile {
            lna_current: Some(Current::Reduced),
            lo_current: Some(Current::Reduced),
            mixer_current: Some(Current::Reduced),
            filter_order: Some(FilterOrder::Third),
            antenna_bias: Some(AntennaBias::Disabled),
            vco_current: Some(Current::Reduced),
            pll_power: Some(Current::Reduced),
            ..Profile::new(reference_divider, adc_resolution)
        }
    }

    pub const fn with_lna_current(mut self, current: Current) -> Self {
        self.lna_current = Some(current);
        self
    }

    pub const fn with_lo_current(mut self, current: Current) -> Self {
        self.lo_current = Some(current);
        self
    }

    pub const fn with_mixer_current(mut self, current: Current) -> Self {
        self.mixer_current = Some(current);
        self
    }

    pub const fn with_filter_order(mut self, order: FilterOrder) -> Self {
        self.filter_order = Some(order);
        self
    }

    pub const fn with_antenna_bias(mut self, bias: AntennaBias) -> Self {
        self.antenna_bias = Some(bias);
        self
    }

    pub const fn with_lna_mode(mut self, mode: LnaMode) -> Self {
        self.lna_mode = Some(mode);
        self
    }

    pub const fn with_vco_current(mut self, current: Current) -> Self {
        self.vco_current = Some(current);
        self
    }

    pub const fn with_pll_power(mut self, power: Current) -> Self {
        self.pll_power = Some(power);
        self
    }

    pub const fn with_iq_channels(mut self, channels: IqChannels) -> Self {
        self.iq_channels = Some(channels);
        self
    }

    /// Field writes for this profile, grouped CONF1, CONF2, CONF3, PLLCONF.
    pub fn field_writes(&self) -> heapless::Vec<FieldWrite, 16> {
        let mut writes = heapless::Vec::new();
        // Capacity covers every optional setting at once.
        let mut push = |w: FieldWrite| {
            writes.push(w).ok();
        };

        /* CONF1 */
        if let Some(current) = self.lna_current {
            match current {
                Current::Normal => {
                    push(FieldWrite::power_on(Register::Conf1, conf1::ILNA1));
                    push(FieldWrite::power_on(Register::Conf1, conf1::ILNA2));
                }
                Current::Reduced => {
                    push(FieldWrite::new(Register::Conf1, conf1::ILNA1, ILNA1_REDUCED));
                    push(FieldWrite::new(Register::Conf1, conf1::ILNA2, ILNA2_REDUCED));
                }
            }
        }
        if let Some(current) = self.lo_current {
            push(match current {
                Current::Normal => FieldWrite::power_on(Register::Conf1, conf1::ILO),
                Current::Reduced => FieldWrite::new(Register::Conf1, conf1::ILO, ILO_REDUCED),
            });
        }
        if let Some(current) = self.mixer_current {
            push(match current {
                Current::Normal => FieldWrite::power_on(Register::Conf1, conf1::IMIX),
                Current::Reduced => FieldWrite::new(Register::Conf1, conf1::IMIX, IMIX_REDUCED),
            });
        }
        if let Some(order) = self.filter_order {
            let bit = match order {
                FilterOrder::Third => 1,
                FilterOrder::Fifth => 0,
            };
            push(FieldWrite::new(Register::Conf1, conf1::F3OR5, bit));
        }
        if let Some(bias) = self.antenna_bias {
            let bit = match bias {
                AntennaBias::Enabled => 1,
                AntennaBias::Disabled => 0,
            };
            push(FieldWrite::new(Register::Conf1, conf1::ANTEN, bit));
        }
        if let Some(mode) = self.lna_mode {
            push(FieldWrite::new(Register::Conf1, conf1::LNAMODE, mode.code()));
        }

        /* CONF2 */
        push(FieldWrite::new(Register::Conf2, conf2::BITS, self.adc_resolution.code()));
        let q_enabled = self.iq_channels.map(|c| match c {
            IqChannels::IOnly => 0,
            IqChannels::IAndQ => 1,
        });
        if let Some(bit) = q_enabled {
            push(FieldWrite::new(Register::Conf2, conf2::IQEN, bit));
        }

        /* CONF3 */
        if let Some(bit) = q_enabled {
            push(FieldWrite::new(Register::Conf3, conf3::PGAQEN, bit));
        }

        /* PLLCONF */
        push(FieldWrite::new(Register::PllConf, pllconf::REFDIV, self.reference_divider.code()));
        if let Some(current) = self.vco_current {
            let bit = match current {
                Current::Normal => pllconf::IVCO.default_for(Register::PllConf),
                Current::Reduced => 1,
            };
            push(FieldWrite::new(Register::PllConf, pllconf::IVCO, bit));
        }
        if let Some(power) = self.pll_power {
            let bit = match power {
                Current::Normal => pllconf::PWRSAV.default_for(Register::PllConf),
                Current::Reduced => 1,
            };
            push(FieldWrite::new(Register::PllConf, pllconf::PWRSAV, bit));
        }

        writes
    }
}
