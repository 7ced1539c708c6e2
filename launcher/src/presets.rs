//! Demo scenes.
//!
//! Each preset is an ordered list of spawn requests plus the camera view and
//! the reset behavior the run loop should use. Paths, sizes and colors follow
//! the classic demo scenes: an empty stage, a single cuboid, a mix of
//! primitives, cones dropped over four origins, and robots per environment.

use nalgebra::{Quaternion, UnitQuaternion, Vector3};
use sim::spawn::{
    ArticulationRootProps, AssetFileCfg, CollisionProps, DeformableMaterial, DeformableProps,
    GroundPlaneCfg, LightCfg, MassProps, PhysicsMaterial, RigidBodyProps, ShapeCfg,
    VisualMaterial,
};
use sim::{
    ActuatorCfg, ArticulationCfg, CylinderShell, InitialState, Placement, ResetPolicy,
    SceneSetupError, SpawnCfg, SpawnRequest,
};

use crate::assets::{DOFBOT_ASSET, JETBOT_ASSET, TABLE_ASSET};
use crate::cli::Preset;

/// Spacing between environment origins in the robots scene (meters).
pub const ENV_SPACING: f32 = 2.0;

pub struct Scene {
    pub preset: Preset,
    pub requests: Vec<SpawnRequest>,
    pub camera_eye: Vector3<f32>,
    pub camera_target: Vector3<f32>,
    /// Drive dynamic objects through periodic resets. Otherwise the loop only steps.
    pub track_dynamic: bool,
    pub reset_policy: ResetPolicy,
}

/// Knobs the command line exposes to scene construction.
#[derive(Clone, Copy, Debug)]
pub struct SceneParams {
    pub cuboid_size: f32,
    pub num_envs: u32,
}

impl Scene {
    fn new(preset: Preset, eye: [f32; 3], target: [f32; 3]) -> Self {
        Self {
            preset,
            requests: Vec::new(),
            camera_eye: Vector3::from(eye),
            camera_target: Vector3::from(target),
            track_dynamic: false,
            reset_policy: ResetPolicy::Fixed,
        }
    }
}

pub fn build(preset: Preset, params: SceneParams) -> Result<Scene, SceneSetupError> {
    match preset {
        Preset::Empty => Ok(Scene::new(preset, [2.5, 2.5, 2.5], [0.0, 0.0, 0.0])),
        Preset::Cuboid => cuboid_scene(params.cuboid_size),
        Preset::SpawnPrims => spawn_prims_scene(),
        Preset::RigidObject => rigid_object_scene(),
        Preset::Robots => robots_scene(params.num_envs),
    }
}

fn ground() -> Result<SpawnRequest, SceneSetupError> {
    SpawnRequest::at("/World/defaultGroundPlane", GroundPlaneCfg::default())
}

fn distant_light() -> Result<SpawnRequest, SceneSetupError> {
    Ok(
        SpawnRequest::at("/World/lightDistant", LightCfg::distant(3000.0, [0.75, 0.75, 0.75]))?
            .with_placement(Placement::at(1.0, 0.0, 10.0)),
    )
}

fn cuboid_scene(size: f32) -> Result<Scene, SceneSetupError> {
    let mut scene = Scene::new(Preset::Cuboid, [2.0, 0.0, 2.5], [-0.5, 0.0, 0.5]);
    let cuboid = ShapeCfg::cuboid([size; 3])
        .with_visual_material(VisualMaterial::preview_surface([1.0, 1.0, 1.0]));
    scene.requests = vec![
        ground()?,
        distant_light()?,
        SpawnRequest::at("/World/Object", cuboid)?
            .with_placement(Placement::at(0.0, 0.0, size / 2.0)),
    ];
    Ok(scene)
}

fn spawn_prims_scene() -> Result<Scene, SceneSetupError> {
    let mut scene = Scene::new(Preset::SpawnPrims, [2.0, 0.0, 2.5], [-0.5, 0.0, 0.5]);

    let red_cone = ShapeCfg::cone(0.15, 0.5)
        .with_visual_material(VisualMaterial::preview_surface([1.0, 0.0, 0.0]));
    let green_cone = ShapeCfg::cone(0.15, 0.5)
        .with_rigid_body(RigidBodyProps::default())
        .with_mass(MassProps::mass(1.0))
        .with_collision(CollisionProps::default())
        .with_visual_material(VisualMaterial::preview_surface([0.0, 1.0, 0.0]));
    let blue_cuboid = ShapeCfg::cuboid([0.2, 0.5, 0.2])
        .with_deformable(DeformableProps::default())
        .with_physics_material(PhysicsMaterial::Deformable(DeformableMaterial::default()))
        .with_visual_material(VisualMaterial::preview_surface([0.0, 0.0, 1.0]));
    // (w, x, y, z) = (0.5, 0, 0.5, 0), normalized.
    let tilted = UnitQuaternion::from_quaternion(Quaternion::new(0.5, 0.0, 0.5, 0.0));

    scene.requests = vec![
        ground()?,
        distant_light()?,
        SpawnRequest::at("/World/Objects", SpawnCfg::Xform)?,
        SpawnRequest::at("/World/Objects/Cone1", red_cone.clone())?
            .with_placement(Placement::at(-1.0, 1.0, 1.0)),
        SpawnRequest::at("/World/Objects/Cone2", red_cone)?
            .with_placement(Placement::at(-1.0, -1.0, 1.0)),
        SpawnRequest::at("/World/Objects/ConeRigid", green_cone)?
            .with_placement(Placement::at(-0.2, 0.0, 2.0).with_orientation(tilted)),
        SpawnRequest::at("/World/Objects/CuboidDeformable", blue_cuboid)?
            .with_placement(Placement::at(0.15, 0.0, 2.0)),
        SpawnRequest::at("/World/Objects/Table", AssetFileCfg::new(TABLE_ASSET))?
            .with_placement(Placement::at(0.0, 0.0, 1.05)),
    ];
    Ok(scene)
}

/// Origins of the four cones in the rigid-object scene.
pub const CONE_ORIGINS: [[f32; 3]; 4] = [
    [0.25, 0.25, 0.0],
    [-0.25, 0.25, 0.0],
    [0.25, -0.25, 0.0],
    [-0.25, -0.25, 0.0],
];

fn rigid_object_scene() -> Result<Scene, SceneSetupError> {
    let mut scene = Scene::new(Preset::RigidObject, [1.5, 0.0, 1.0], [0.0, 0.0, 0.0]);
    scene.track_dynamic = true;
    scene.reset_policy = ResetPolicy::Randomized(CylinderShell::surface(0.1, (0.25, 0.5)));

    scene.requests.push(ground()?);
    scene
        .requests
        .push(SpawnRequest::at("/World/Light", LightCfg::dome(2000.0, [0.8, 0.8, 0.8]))?);
    for (i, [x, y, z]) in CONE_ORIGINS.iter().enumerate() {
        scene.requests.push(
            SpawnRequest::at(&format!("/World/Origin{i}"), SpawnCfg::Xform)?
                .with_placement(Placement::at(*x, *y, *z)),
        );
    }

    let cone = ShapeCfg::cone(0.1, 0.2)
        .with_rigid_body(RigidBodyProps::default())
        .with_mass(MassProps::mass(1.0))
        .with_collision(CollisionProps::default())
        .with_visual_material(VisualMaterial::preview_surface([0.0, 1.0, 0.0]).with_metallic(0.2));
    scene
        .requests
        .push(SpawnRequest::pattern("/World/Origin.*/Cone", cone)?.named("cone"));
    Ok(scene)
}

/// Grid of environment origins, centered on the world origin.
///
/// Rows grow along -X and columns along +Y; the grid is as square as possible.
pub fn env_origins(num_envs: u32, spacing: f32) -> Vec<[f32; 3]> {
    if num_envs == 0 {
        return Vec::new();
    }
    let n = num_envs as usize;
    let side = (n as f64).sqrt().floor() as usize;
    let rows = n.div_ceil(side.max(1));
    let cols = n.div_ceil(rows);

    let row_mid = (rows as f32 - 1.0) / 2.0;
    let col_mid = (cols as f32 - 1.0) / 2.0;
    (0..rows)
        .flat_map(|i| (0..cols).map(move |j| (i, j)))
        .take(n)
        .map(|(i, j)| {
            [
                -(i as f32 - row_mid) * spacing,
                (j as f32 - col_mid) * spacing,
                0.0,
            ]
        })
        .collect()
}

fn jetbot() -> ArticulationCfg {
    ArticulationCfg::new(JETBOT_ASSET).with_actuator("wheel_acts", ActuatorCfg::implicit(&[".*"]))
}

fn dofbot() -> ArticulationCfg {
    let mut init_state = InitialState {
        pos: Vector3::new(0.25, -0.25, 0.0),
        ..InitialState::default()
    };
    for joint in ["joint1", "joint2", "joint3", "joint4"] {
        init_state.joint_pos.insert(joint.to_string(), 0.0);
    }
    let arm_actuator = |exprs: &[&str]| {
        ActuatorCfg::implicit(exprs)
            .with_gains(10_000.0, 100.0)
            .with_limits(100.0, 100.0)
    };

    ArticulationCfg::new(DOFBOT_ASSET)
        .with_rigid_body(RigidBodyProps {
            max_depenetration_velocity: Some(5.0),
            ..RigidBodyProps::default()
        })
        .with_articulation_root(ArticulationRootProps {
            enabled_self_collisions: true,
            solver_position_iteration_count: 8,
            solver_velocity_iteration_count: 0,
            fix_root_link: false,
        })
        .with_init_state(init_state)
        .with_actuator("front_joints", arm_actuator(&["joint[1-2]"]))
        .with_actuator("joint3_act", arm_actuator(&["joint3"]))
        .with_actuator("joint4_act", arm_actuator(&["joint4"]))
}

fn robots_scene(num_envs: u32) -> Result<Scene, SceneSetupError> {
    let mut scene = Scene::new(Preset::Robots, [3.5, 0.0, 3.2], [0.0, 0.0, 0.5]);
    scene.track_dynamic = true;

    scene.requests.push(ground()?);
    scene
        .requests
        .push(SpawnRequest::at("/World/Light", LightCfg::dome(3000.0, [0.75, 0.75, 0.75]))?);
    scene
        .requests
        .push(SpawnRequest::at("/World/envs", SpawnCfg::Xform)?);
    for (i, [x, y, z]) in env_origins(num_envs, ENV_SPACING).iter().enumerate() {
        scene.requests.push(
            SpawnRequest::at(&format!("/World/envs/env_{i}"), SpawnCfg::Xform)?
                .with_placement(Placement::at(*x, *y, *z)),
        );
    }
    // Lift the root links so their collision boxes start clear of the ground.
    scene.requests.push(
        SpawnRequest::pattern("/World/envs/env_.*/Jetbot", jetbot())?
            .with_placement(Placement::at(0.0, 0.0, 0.05)),
    );
    scene.requests.push(
        SpawnRequest::pattern("/World/envs/env_.*/Dofbot", dofbot())?
            .with_placement(Placement::at(0.0, 0.0, 0.04)),
    );
    Ok(scene)
}
