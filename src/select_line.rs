// src/select_line.rs

use core::convert::Infallible;
use embedded_hal::digital::OutputPin;

/// An active-low chip-select output.
pub struct SelectLine<CS> {
    cs: CS,
}

impl<CS> SelectLine<CS>
where
    CS: OutputPin<Error = Infallible>,
{
    /// Takes the pin and parks it released (high).
    pub fn new(mut cs: CS) -> Self {
        cs.set_high().ok();
        SelectLine { cs }
    }

    /// Drives the line low until the returned guard is dropped.
    pub fn assert(&mut self) -> SelectGuard<'_, CS> {
        self.cs.set_low().ok();
        SelectGuard { cs: &mut self.cs }
    }

    pub fn release(self) -> CS {
        self.cs
    }
}

/// Holds a select line low. Dropping it drives the line high again.
pub struct SelectGuard<'a, CS>
where
    CS: OutputPin<Error = Infallible>,
{
    cs: &'a mut CS,
}

impl<CS> Drop for SelectGuard<'_, CS>
where
    CS: OutputPin<Error = Infallible>,
{
    fn drop(&mut self) {
        self.cs.set_high().ok();
    }
}
