use std::borrow::Borrow;

use crate::coords::{Mat4, Viewport};
use crate::device::{
    BlendFactor, Capability, GraphicsDevice, StateGuard, TransformSlot, VertexStream,
};

use super::DrawCallList;

/// Counters for one render pass.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct RenderStats {
    pub lists: usize,
    pub commands: usize,
    pub vertices: u64,
}

/// Renders `lists` in order onto the device's current framebuffer.
///
/// Later commands paint over earlier ones; depth testing is off. Device
/// state (capabilities, blend function, scissor box, bound texture,
/// transforms) is exactly as found when this returns. An empty collection
/// issues no device calls.
///
/// The vertex offset runs across all lists: list `n` is bound with its first
/// vertex at the offset reached after the commands of lists `0..n`.
pub fn render_draw_lists<D, L>(device: &mut D, viewport: Viewport, lists: &[L]) -> RenderStats
where
    D: GraphicsDevice + ?Sized,
    L: Borrow<DrawCallList>,
{
    let mut stats = RenderStats::default();
    if lists.is_empty() {
        return stats;
    }

    let mut device = StateGuard::new(device);

    device.set_capability(Capability::Blend, true);
    device.set_blend_func(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha);
    device.set_capability(Capability::CullFace, false);
    device.set_capability(Capability::DepthTest, false);
    device.set_capability(Capability::ScissorTest, true);
    device.set_capability(Capability::VertexArrays, true);
    device.set_capability(Capability::Texture2d, true);

    device.set_transform(
        TransformSlot::Projection,
        Mat4::screen_ortho(viewport.width as f32, viewport.height as f32),
    );
    device.set_transform(TransformSlot::Model, Mat4::identity());

    let mut offset: u32 = 0;
    for list in lists {
        let list = list.borrow();
        device.bind_vertices(VertexStream::new(offset, list.vertices()));

        for cmd in list.commands() {
            device.set_scissor(cmd.clip_rect.to_scissor(viewport.height));
            device.bind_texture(cmd.texture);
            device.draw_triangles(offset, cmd.vertex_count);
            offset = offset.saturating_add(cmd.vertex_count);
            stats.commands += 1;
        }
        stats.lists += 1;
    }
    stats.vertices = u64::from(offset);

    log::trace!(
        "rendered {} lists, {} commands, {} vertices at {}x{}",
        stats.lists,
        stats.commands,
        stats.vertices,
        viewport.width,
        viewport.height
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::{ClipRect, ScissorRect};
    use crate::device::{DeviceCall, RecordingDevice, TextureId};
    use crate::render::Vertex;

    fn tri(tag: f32, n: usize) -> Vec<Vertex> {
        (0..n).map(|i| Vertex::new([tag, i as f32], [0.0, 0.0], [255; 4])).collect()
    }

    fn two_command_list() -> DrawCallList {
        let mut list = DrawCallList::new();
        list.push(ClipRect::new(10.0, 20.0, 100.0, 50.0), TextureId(1), &tri(0.0, 3));
        list.push(ClipRect::new(0.0, 100.0, 30.0, 40.0), TextureId(2), &tri(1.0, 6));
        list
    }

    fn draws(device: &RecordingDevice) -> Vec<(u32, u32)> {
        device
            .calls()
            .iter()
            .filter_map(|c| match c {
                DeviceCall::DrawTriangles { first, count } => Some((*first, *count)),
                _ => None,
            })
            .collect()
    }

    fn scissors(device: &RecordingDevice) -> Vec<ScissorRect> {
        device
            .calls()
            .iter()
            .filter_map(|c| match c {
                DeviceCall::SetScissor(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn two_commands_draw_at_running_offsets() {
        let mut device = RecordingDevice::new();
        let stats = render_draw_lists(&mut device, Viewport::new(800, 600), &[two_command_list()]);

        assert_eq!(draws(&device), [(0, 3), (3, 6)]);
        assert_eq!(
            scissors(&device),
            [
                ScissorRect::new(10, 600 - (20 + 50), 100, 50),
                ScissorRect::new(0, 600 - (100 + 40), 30, 40),
            ]
        );
        assert_eq!(stats, RenderStats { lists: 1, commands: 2, vertices: 9 });
    }

    #[test]
    fn each_draw_sees_its_own_vertices_and_texture() {
        let mut device = RecordingDevice::new();
        render_draw_lists(&mut device, Viewport::new(800, 600), &[two_command_list()]);

        let d = device.draws();
        assert_eq!(d[0].texture, Some(TextureId(1)));
        assert_eq!(d[1].texture, Some(TextureId(2)));
        assert!(d[0].vertices.iter().all(|v| v.pos[0] == 0.0));
        assert!(d[1].vertices.iter().all(|v| v.pos[0] == 1.0));
        assert_eq!(d[1].vertices.len(), 6);
        assert_eq!(
            d[0].blend,
            Some((BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha))
        );
    }

    #[test]
    fn offset_continues_across_lists() {
        let mut a = DrawCallList::new();
        a.push(ClipRect::default(), TextureId(1), &tri(0.0, 3));
        let mut b = DrawCallList::new();
        b.push(ClipRect::default(), TextureId(1), &tri(1.0, 6));

        let mut device = RecordingDevice::new();
        render_draw_lists(&mut device, Viewport::new(64, 64), &[&a, &b]);

        assert_eq!(draws(&device), [(0, 3), (3, 6)]);
        let binds: Vec<u32> = device
            .calls()
            .iter()
            .filter_map(|c| match c {
                DeviceCall::BindVertices { base, .. } => Some(*base),
                _ => None,
            })
            .collect();
        assert_eq!(binds, [0, 3]);
        assert!(device.draws()[1].vertices.iter().all(|v| v.pos[0] == 1.0));
    }

    #[test]
    fn empty_collection_is_a_no_op() {
        let mut device = RecordingDevice::new();
        device.set_capability(Capability::CullFace, true);
        device.clear_log();
        let before = device.state();

        let lists: [DrawCallList; 0] = [];
        let stats = render_draw_lists(&mut device, Viewport::new(800, 600), &lists);

        assert_eq!(device.state(), before);
        assert!(device.calls().is_empty());
        assert_eq!(stats, RenderStats::default());
    }

    #[test]
    fn state_is_restored_after_render() {
        let mut device = RecordingDevice::new();
        device.set_capability(Capability::DepthTest, true);
        device.set_capability(Capability::CullFace, true);
        device.bind_texture(TextureId(42));
        device.set_scissor(ScissorRect::new(1, 1, 5, 5));
        let before = device.state();

        render_draw_lists(&mut device, Viewport::new(320, 240), &[two_command_list()]);

        assert_eq!(device.state(), before);
        assert_eq!(device.calls().last(), Some(&DeviceCall::RestoreState));
    }

    #[test]
    fn pass_state_is_set_before_first_draw() {
        let mut device = RecordingDevice::new();
        render_draw_lists(&mut device, Viewport::new(200, 100), &[two_command_list()]);

        let first_draw = device
            .calls()
            .iter()
            .position(|c| matches!(c, DeviceCall::DrawTriangles { .. }))
            .unwrap();
        let setup = &device.calls()[..first_draw];
        for (cap, enabled) in [
            (Capability::Blend, true),
            (Capability::CullFace, false),
            (Capability::DepthTest, false),
            (Capability::ScissorTest, true),
            (Capability::Texture2d, true),
            (Capability::VertexArrays, true),
        ] {
            assert!(
                setup.contains(&DeviceCall::SetCapability { cap, enabled }),
                "{cap:?} not set to {enabled}"
            );
        }
        assert!(setup.contains(&DeviceCall::SetTransform {
            slot: TransformSlot::Projection,
            matrix: Mat4::screen_ortho(200.0, 100.0),
        }));
        assert!(setup.contains(&DeviceCall::SetTransform {
            slot: TransformSlot::Model,
            matrix: Mat4::identity(),
        }));
    }

    #[test]
    fn zero_vertex_command_still_sets_state() {
        let mut list = DrawCallList::new();
        list.push(ClipRect::new(0.0, 0.0, 4.0, 4.0), TextureId(5), &[]);
        list.push(ClipRect::new(0.0, 0.0, 4.0, 4.0), TextureId(6), &tri(0.0, 3));

        let mut device = RecordingDevice::new();
        render_draw_lists(&mut device, Viewport::new(4, 4), &[list]);

        assert_eq!(draws(&device), [(0, 0), (0, 3)]);
        assert!(device.calls().contains(&DeviceCall::BindTexture(TextureId(5))));
    }
}
