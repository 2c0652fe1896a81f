use pimwave_core_rs::num::Offset;

use super::{Component, Layer};

/// Slides every `M` offset along its diagonal over the run of matching symbols.
pub(crate) fn extend<O: Offset>(component: &mut Component<O>, pattern: &[u8], text: &[u8]) {
    let lo = component.lo();
    let Some(offsets) = component.layer_mut(Layer::M) else {
        return;
    };

    for (ind, offset) in offsets.iter_mut().enumerate() {
        if offset.is_null() {
            continue;
        }
        let k = lo + ind as i32;
        let mut h = offset.widen() as usize;
        let mut v = (offset.widen() - k) as usize;

        while v < pattern.len() && h < text.len() && pattern[v] == text[h] {
            v += 1;
            h += 1;
        }
        *offset = O::narrow(h as i32);
    }
}
