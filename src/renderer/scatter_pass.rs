//! The one forward pass: surface first, then the instance batch.
//!
//! Both drawables share a shader and a pipeline layout
//! (camera / material / lighting). Double-sided materials use a second
//! pipeline without back-face culling.

use crate::gpu::backend::ResourceSet;
use crate::gpu::render_context::RenderContext;
use crate::gpu::wgpu_backend::WgpuBackend;
use crate::instancing::InstanceRaw;
use crate::renderer::pipeline_util;
use crate::surface::MeshVertex;

/// Background behind the scene.
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.62,
    g: 0.71,
    b: 0.82,
    a: 1.0,
};

/// Bind group layouts the scatter shader expects, in group order.
pub struct PassLayouts<'a> {
    /// Group 0: camera uniform.
    pub camera: &'a wgpu::BindGroupLayout,
    /// Group 1: material uniform, maps and sampler.
    pub material: &'a wgpu::BindGroupLayout,
    /// Group 2: lighting uniform.
    pub lighting: &'a wgpu::BindGroupLayout,
}

/// Bind groups shared by every draw in a frame.
pub struct FrameBindings<'a> {
    /// Group 0.
    pub camera: &'a wgpu::BindGroup,
    /// Group 2.
    pub lighting: &'a wgpu::BindGroup,
}

/// Pipelines and depth target for the scatter scene.
pub struct ScatterPass {
    cull_back: wgpu::RenderPipeline,
    no_cull: wgpu::RenderPipeline,
    depth_view: wgpu::TextureView,
}

impl ScatterPass {
    /// Build both pipelines for the context's swapchain format and a depth
    /// target at its size.
    pub fn new(context: &RenderContext, layouts: &PassLayouts<'_>) -> Self {
        let shader = context
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Scatter Shader"),
                source: wgpu::ShaderSource::Wgsl(
                    include_str!("../../assets/shaders/scatter.wgsl").into(),
                ),
            });
        let pipeline_layout = context.device.create_pipeline_layout(
            &wgpu::PipelineLayoutDescriptor {
                label: Some("Scatter Pipeline Layout"),
                bind_group_layouts: &[layouts.camera, layouts.material, layouts.lighting],
                push_constant_ranges: &[],
            },
        );

        let pipeline = |label: &str, cull_mode: Option<wgpu::Face>| {
            context
                .device
                .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some(label),
                    layout: Some(&pipeline_layout),
                    vertex: wgpu::VertexState {
                        module: &shader,
                        entry_point: Some("vs_main"),
                        buffers: &[MeshVertex::buffer_layout(), InstanceRaw::buffer_layout()],
                        compilation_options: Default::default(),
                    },
                    fragment: Some(wgpu::FragmentState {
                        module: &shader,
                        entry_point: Some("fs_main"),
                        targets: &pipeline_util::surface_fragment_targets(context.format()),
                        compilation_options: Default::default(),
                    }),
                    primitive: wgpu::PrimitiveState {
                        topology: wgpu::PrimitiveTopology::TriangleList,
                        front_face: wgpu::FrontFace::Ccw,
                        cull_mode,
                        ..Default::default()
                    },
                    depth_stencil: Some(pipeline_util::depth_stencil_state()),
                    multisample: wgpu::MultisampleState::default(),
                    multiview: None,
                    cache: None,
                })
        };

        Self {
            cull_back: pipeline("Scatter Pipeline", Some(wgpu::Face::Back)),
            no_cull: pipeline("Scatter Pipeline (double-sided)", None),
            depth_view: {
                let (width, height) = context.size();
                pipeline_util::create_depth_view(&context.device, width, height)
            },
        }
    }

    /// Recreate the depth target for a new window size.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_view = pipeline_util::create_depth_view(device, width, height);
    }

    /// Clear `target` and draw each drawable in order.
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        frame: &FrameBindings<'_>,
        drawables: &[&ResourceSet<WgpuBackend>],
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scatter Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            ..Default::default()
        });

        pass.set_bind_group(0, frame.camera, &[]);
        pass.set_bind_group(2, frame.lighting, &[]);

        for set in drawables {
            if set.index_count == 0 || set.instance_count == 0 {
                continue;
            }
            let pipeline = if set.material.double_sided {
                &self.no_cull
            } else {
                &self.cull_back
            };
            pass.set_pipeline(pipeline);
            pass.set_bind_group(1, &set.material.bind_group, &[]);
            pass.set_vertex_buffer(0, set.mesh.vertex_buffer.slice(..));
            pass.set_vertex_buffer(1, set.instances.buffer.slice(..));
            pass.set_index_buffer(set.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..set.index_count, 0, 0..set.instance_count);
        }
    }
}
