use core::ops::{Deref, DerefMut};

use super::{DeviceState, GraphicsDevice};

/// Scoped device-state save/restore.
///
/// Captures [`GraphicsDevice::state`] on construction and restores it when
/// dropped, on every exit path. Derefs to the device so work can proceed
/// through the guard.
pub struct StateGuard<'d, D: GraphicsDevice + ?Sized> {
    device: &'d mut D,
    saved: DeviceState,
}

impl<'d, D: GraphicsDevice + ?Sized> StateGuard<'d, D> {
    pub fn new(device: &'d mut D) -> Self {
        let saved = device.state();
        Self { device, saved }
    }

    /// The state that will be restored on drop.
    pub fn saved(&self) -> &DeviceState {
        &self.saved
    }
}

impl<D: GraphicsDevice + ?Sized> Deref for StateGuard<'_, D> {
    type Target = D;

    fn deref(&self) -> &D {
        self.device
    }
}

impl<D: GraphicsDevice + ?Sized> DerefMut for StateGuard<'_, D> {
    fn deref_mut(&mut self) -> &mut D {
        self.device
    }
}

impl<D: GraphicsDevice + ?Sized> Drop for StateGuard<'_, D> {
    fn drop(&mut self) {
        self.device.restore_state(&self.saved);
    }
}
