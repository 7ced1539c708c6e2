//! Rapier-backed simulation host.
//!
//! `RapierWorld` implements the three service traits on top of a single
//! in-memory rapier scene: prims are tracked by path, dynamic entities get a
//! rigid body (and an [`ObjectHandle`]), static decoration gets a fixed body or
//! nothing at all.
//!
//! Design
//! - Deterministic: prims live in a `BTreeMap` keyed by path and handles are
//!   issued sequentially, so the same spawn sequence builds the same world.
//! - Articulations are represented by their root link only. Joint names, initial
//!   joint state and the joint→actuator table are resolved and stored, but no
//!   joint dynamics are simulated.
//! - Deformable shapes are approximated by rigid bodies.
//!
//! Timeline
//! - `reset()` starts playing; `step()` before that fails with `NotPlaying`.
//! - `is_running()` turns false after `stop()` or once the optional step budget is spent.
//!
//! State buffers
//! - Pose/velocity writes are validated, buffered and marked pending.
//! - `write_data_to_sim()` pushes pending buffers into the bodies.
//! - `update()` refreshes a buffer from its body after a step.

use std::collections::BTreeMap;

use log::{debug, info, warn};
use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};
use rapier3d::prelude::*;

use crate::articulation::{ArticulationCfg, ResolvedArticulation, resolve_articulation};
use crate::asset::AssetLibrary;
use crate::constants::{DIST_EPS, WORLD_ROOT};
use crate::error::{SceneSetupError, SimError, StateError, StepError};
use crate::prim_path::{PrimPath, PrimPattern};
use crate::rapier::{
    body_from_props, collider_from_geometry, ground_collider, scale_geometry,
    unmapped_body_settings, unmapped_material_settings, unmapped_root_settings, with_collision,
    with_mass, with_material, with_root_props,
};
use crate::service::{ObjectHandle, ObjectState, Placement, SceneGraph, Simulation};
use crate::sim_config::SimulationConfig;
use crate::spawn::{AssetFileCfg, PhysicsMaterial, ShapeCfg, SpawnCfg};
use crate::state::{POSE_LEN, Pose, VELOCITY_LEN, Velocity};

/// Bookkeeping for one prim of the scene.
#[derive(Clone, Debug, PartialEq)]
pub struct PrimRecord {
    pub kind: &'static str,
    /// Transform relative to the parent prim.
    pub local: Isometry3<f32>,
    pub world: Isometry3<f32>,
    pub handle: Option<ObjectHandle>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraView {
    pub eye: Vector3<f32>,
    pub target: Vector3<f32>,
}

struct ObjectSlot {
    path: PrimPath,
    body: RigidBodyHandle,
    pose: Pose,
    velocity: Velocity,
    pose_pending: bool,
    velocity_pending: bool,
    articulation: Option<ResolvedArticulation>,
}

pub struct RapierWorld {
    config: SimulationConfig,
    assets: AssetLibrary,

    params: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd: CCDSolver,

    prims: BTreeMap<PrimPath, PrimRecord>,
    objects: Vec<ObjectSlot>,
    camera: Option<CameraView>,

    playing: bool,
    stopped: bool,
    steps: u64,
    step_budget: Option<u64>,
}

fn isometry(translation: Vector3<f32>, rotation: UnitQuaternion<f32>) -> Isometry3<f32> {
    Isometry3::from_parts(Translation3::from(translation), rotation)
}

fn warn_unmapped(path: &PrimPath, settings: &[&str]) {
    if !settings.is_empty() {
        warn!("{path}: {} not supported by the rapier backend, ignored", settings.join(", "));
    }
}

fn pose_of(iso: &Isometry3<f32>) -> Pose {
    Pose {
        position: iso.translation.vector,
        orientation: iso.rotation,
    }
}

impl RapierWorld {
    /// Create an empty world containing only the `/World` prim.
    pub fn new(config: SimulationConfig, assets: AssetLibrary) -> Result<Self, SimError> {
        config.validate()?;
        let params = IntegrationParameters {
            dt: config.dt,
            ..IntegrationParameters::default()
        };

        let mut prims = BTreeMap::new();
        let world_root = PrimPath::parse(WORLD_ROOT).map_err(|e| SimError::Launch(e.to_string()))?;
        prims.insert(
            world_root,
            PrimRecord {
                kind: "xform",
                local: Isometry3::identity(),
                world: Isometry3::identity(),
                handle: None,
            },
        );

        info!(
            "Simulation backend ready: dt={}s gravity={:?} device={}",
            config.dt,
            config.gravity.as_slice(),
            config.device
        );

        Ok(Self {
            config,
            assets,
            params,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: BroadPhaseBvh::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            prims,
            objects: Vec::new(),
            camera: None,
            playing: false,
            stopped: false,
            steps: 0,
            step_budget: None,
        })
    }

    /// Stop reporting `is_running()` after `steps` steps. `None` runs until `stop()`.
    pub fn with_step_budget(mut self, steps: Option<u64>) -> Self {
        self.step_budget = steps;
        self
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn stop(&mut self) {
        self.stopped = true;
        self.playing = false;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn camera(&self) -> Option<CameraView> {
        self.camera
    }

    pub fn prim(&self, path: &PrimPath) -> Option<&PrimRecord> {
        self.prims.get(path)
    }

    pub fn prim_count(&self) -> usize {
        self.prims.len()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn object_path(&self, handle: ObjectHandle) -> Option<&PrimPath> {
        self.objects.get(handle.0 as usize).map(|slot| &slot.path)
    }

    /// Resolved joints and actuator table of an articulation root.
    pub fn articulation(&self, handle: ObjectHandle) -> Option<&ResolvedArticulation> {
        self.objects
            .get(handle.0 as usize)
            .and_then(|slot| slot.articulation.as_ref())
    }

    fn parent_world(&self, path: &PrimPath) -> Result<Isometry3<f32>, SceneSetupError> {
        let parent = path.parent();
        if parent.is_root() {
            return Ok(Isometry3::identity());
        }
        self.prims
            .get(&parent)
            .map(|record| record.world)
            .ok_or_else(|| SceneSetupError::MissingParent(path.to_string()))
    }

    fn slot(&self, handle: ObjectHandle) -> Result<&ObjectSlot, StateError> {
        self.objects
            .get(handle.0 as usize)
            .ok_or(StateError::UnknownHandle(handle))
    }

    fn slot_mut(&mut self, handle: ObjectHandle) -> Result<&mut ObjectSlot, StateError> {
        self.objects
            .get_mut(handle.0 as usize)
            .ok_or(StateError::UnknownHandle(handle))
    }

    fn insert_object(
        &mut self,
        path: &PrimPath,
        body: RigidBody,
        collider: Collider,
        articulation: Option<ResolvedArticulation>,
    ) -> ObjectHandle {
        let pose = pose_of(body.position());
        let velocity = Velocity {
            linear: *body.linvel(),
            angular: *body.angvel(),
        };
        let body = self.bodies.insert(body);
        self.colliders
            .insert_with_parent(collider, body, &mut self.bodies);

        let handle = ObjectHandle(self.objects.len() as u32);
        self.objects.push(ObjectSlot {
            path: path.clone(),
            body,
            pose,
            velocity,
            pose_pending: false,
            velocity_pending: false,
            articulation,
        });
        handle
    }

    fn insert_fixed(&mut self, world: Isometry3<f32>, collider: Collider) {
        let body = self.bodies.insert(RigidBodyBuilder::fixed().pose(world).build());
        self.colliders
            .insert_with_parent(collider, body, &mut self.bodies);
    }

    fn spawn_shape(
        &mut self,
        path: &PrimPath,
        cfg: &ShapeCfg,
        world: Isometry3<f32>,
    ) -> Option<ObjectHandle> {
        let mut collider = collider_from_geometry(&cfg.geometry);
        if let Some(PhysicsMaterial::Rigid(material)) = &cfg.physics_material {
            warn_unmapped(path, &unmapped_material_settings(material));
            collider = with_material(collider, material);
        }
        if let Some(collision) = &cfg.collision {
            collider = with_collision(collider, collision);
        }

        if let Some(props) = &cfg.rigid_body {
            if let Some(mass) = &cfg.mass {
                collider = with_mass(collider, mass);
            }
            warn_unmapped(path, &unmapped_body_settings(props));
            let body = body_from_props(props).pose(world).build();
            return Some(self.insert_object(path, body, collider.build(), None));
        }

        if cfg.deformable.is_some() {
            warn!("{path}: deformable bodies are simulated as rigid bodies");
            if let Some(PhysicsMaterial::Deformable(material)) = &cfg.physics_material {
                collider = collider.friction(material.dynamic_friction);
                if let Some(density) = material.density {
                    collider = collider.density(density);
                }
            }
            let body = RigidBodyBuilder::dynamic().pose(world).build();
            return Some(self.insert_object(path, body, collider.build(), None));
        }

        if cfg.collision.is_some() {
            self.insert_fixed(world, collider.build());
        }
        None
    }

    fn spawn_asset(
        &mut self,
        path: &PrimPath,
        cfg: &AssetFileCfg,
        world: Isometry3<f32>,
    ) -> Result<Option<ObjectHandle>, SceneSetupError> {
        let asset = self.assets.resolve(&cfg.asset_path)?;
        let geometry = scale_geometry(&asset.collision, cfg.scale);
        let default_mass = asset.mass;
        let collider = collider_from_geometry(&geometry);

        match &cfg.rigid_body {
            Some(props) => {
                warn_unmapped(path, &unmapped_body_settings(props));
                let collider = match &cfg.mass {
                    Some(mass) => with_mass(collider, mass),
                    None => collider.mass(default_mass),
                };
                let body = body_from_props(props).pose(world).build();
                Ok(Some(self.insert_object(path, body, collider.build(), None)))
            }
            None => {
                self.insert_fixed(world, collider.build());
                Ok(None)
            }
        }
    }

    fn spawn_articulation(
        &mut self,
        path: &PrimPath,
        cfg: &ArticulationCfg,
        world: Isometry3<f32>,
    ) -> Result<ObjectHandle, SceneSetupError> {
        let asset = self.assets.resolve(&cfg.asset_path)?;
        let resolved = resolve_articulation(&path.to_string(), cfg, asset)?;
        let collider = collider_from_geometry(&asset.collision)
            .mass(asset.mass)
            .build();

        let init = &cfg.init_state;
        let root = world * isometry(init.pos, init.rot);
        let root_props = cfg.articulation_root.unwrap_or_default();
        let mut builder = if root_props.fix_root_link {
            RigidBodyBuilder::kinematic_position_based()
        } else {
            body_from_props(&cfg.rigid_body.unwrap_or_default())
        };
        if let Some(props) = &cfg.rigid_body {
            warn_unmapped(path, &unmapped_body_settings(props));
        }
        if let Some(props) = &cfg.articulation_root {
            warn_unmapped(path, &unmapped_root_settings(props));
            builder = with_root_props(builder, props);
        }
        let body = builder
            .pose(root)
            .linvel(init.lin_vel)
            .angvel(init.ang_vel)
            .build();

        info!(
            "{path}: articulation with {} joints ({} actuated)",
            resolved.joint_names.len(),
            resolved.drives.iter().filter(|d| d.is_some()).count()
        );
        Ok(self.insert_object(path, body, collider, Some(resolved)))
    }

    fn sync_from_body(&mut self, handle: ObjectHandle) -> Result<(), StateError> {
        let body_handle = self.slot(handle)?.body;
        let body = self
            .bodies
            .get(body_handle)
            .ok_or(StateError::UnknownHandle(handle))?;
        let pose = pose_of(body.position());
        let velocity = Velocity {
            linear: *body.linvel(),
            angular: *body.angvel(),
        };
        let slot = self.slot_mut(handle)?;
        slot.pose = pose;
        slot.velocity = velocity;
        Ok(())
    }
}

impl SceneGraph for RapierWorld {
    fn create_prim(
        &mut self,
        path: &PrimPath,
        cfg: &SpawnCfg,
        placement: &Placement,
    ) -> Result<Option<ObjectHandle>, SceneSetupError> {
        if path.is_root() || self.prims.contains_key(path) {
            return Err(SceneSetupError::DuplicatePath(path.to_string()));
        }
        let parent = self.parent_world(path)?;
        cfg.validate()
            .map_err(|reason| SceneSetupError::InvalidConfig {
                path: path.to_string(),
                reason,
            })?;

        let local = isometry(placement.translation, placement.orientation);
        let world = parent * local;

        let handle = match cfg {
            SpawnCfg::Xform => None,
            SpawnCfg::GroundPlane(ground) => {
                warn_unmapped(path, &unmapped_material_settings(&ground.physics_material));
                self.insert_fixed(world, ground_collider(&ground.physics_material));
                None
            }
            SpawnCfg::Light(light) => {
                debug!("{path}: light with intensity {}", light.intensity);
                None
            }
            SpawnCfg::Shape(shape) => self.spawn_shape(path, shape, world),
            SpawnCfg::AssetFile(asset) => self.spawn_asset(path, asset, world)?,
            SpawnCfg::Articulation(articulation) => {
                Some(self.spawn_articulation(path, articulation, world)?)
            }
        };

        self.prims.insert(
            path.clone(),
            PrimRecord {
                kind: cfg.kind_name(),
                local,
                world,
                handle,
            },
        );
        Ok(handle)
    }

    fn find_prims(&self, pattern: &PrimPattern) -> Vec<PrimPath> {
        pattern.expand(self.prims.keys())
    }

    fn prim_exists(&self, path: &PrimPath) -> bool {
        path.is_root() || self.prims.contains_key(path)
    }

    fn world_pose(&self, path: &PrimPath) -> Option<Isometry3<f32>> {
        if path.is_root() {
            return Some(Isometry3::identity());
        }
        self.prims.get(path).map(|record| record.world)
    }
}

impl Simulation for RapierWorld {
    fn reset(&mut self) -> Result<(), SimError> {
        if self.stopped {
            return Err(SimError::Launch("simulation has been stopped".into()));
        }
        for i in 0..self.objects.len() {
            let handle = ObjectHandle(i as u32);
            self.sync_from_body(handle)?;
            let slot = self.slot_mut(handle)?;
            slot.pose_pending = false;
            slot.velocity_pending = false;
        }
        self.playing = true;
        info!(
            "Simulation playing: {} prims, {} dynamic objects",
            self.prims.len(),
            self.objects.len()
        );
        Ok(())
    }

    fn step(&mut self) -> Result<(), StepError> {
        if !self.playing {
            return Err(StepError::NotPlaying);
        }
        self.pipeline.step(
            &self.config.gravity,
            &self.params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            &(),
            &(),
        );
        self.steps += 1;
        Ok(())
    }

    fn is_running(&self) -> bool {
        !self.stopped && self.step_budget.is_none_or(|budget| self.steps < budget)
    }

    fn physics_dt(&self) -> f32 {
        self.config.dt
    }

    fn set_camera_view(&mut self, eye: Vector3<f32>, target: Vector3<f32>) -> Result<(), SimError> {
        if !eye.iter().chain(target.iter()).all(|v| v.is_finite()) {
            return Err(SimError::InvalidCamera("eye and target must be finite"));
        }
        if (eye - target).norm() <= DIST_EPS {
            return Err(SimError::InvalidCamera("eye and target coincide"));
        }
        debug!("camera eye={:?} target={:?}", eye.as_slice(), target.as_slice());
        self.camera = Some(CameraView { eye, target });
        Ok(())
    }
}

impl ObjectState for RapierWorld {
    fn write_pose(&mut self, handle: ObjectHandle, pose: [f32; POSE_LEN]) -> Result<(), StateError> {
        let pose = Pose::try_from_array(pose)?;
        let slot = self.slot_mut(handle)?;
        slot.pose = pose;
        slot.pose_pending = true;
        Ok(())
    }

    fn write_velocity(
        &mut self,
        handle: ObjectHandle,
        velocity: [f32; VELOCITY_LEN],
    ) -> Result<(), StateError> {
        let velocity = Velocity::try_from_array(velocity)?;
        let slot = self.slot_mut(handle)?;
        slot.velocity = velocity;
        slot.velocity_pending = true;
        Ok(())
    }

    fn read_pose(&self, handle: ObjectHandle) -> Result<[f32; POSE_LEN], StateError> {
        Ok(self.slot(handle)?.pose.to_array())
    }

    fn read_velocity(&self, handle: ObjectHandle) -> Result<[f32; VELOCITY_LEN], StateError> {
        Ok(self.slot(handle)?.velocity.to_array())
    }

    fn update(&mut self, handle: ObjectHandle, _dt: f32) -> Result<(), StateError> {
        self.sync_from_body(handle)
    }

    fn write_data_to_sim(&mut self) -> Result<(), StateError> {
        for (i, slot) in self.objects.iter_mut().enumerate() {
            if !(slot.pose_pending || slot.velocity_pending) {
                continue;
            }
            let body = self
                .bodies
                .get_mut(slot.body)
                .ok_or(StateError::UnknownHandle(ObjectHandle(i as u32)))?;
            if slot.pose_pending {
                body.set_position(isometry(slot.pose.position, slot.pose.orientation), true);
                slot.pose_pending = false;
            }
            if slot.velocity_pending {
                body.set_linvel(slot.velocity.linear, true);
                body.set_angvel(slot.velocity.angular, true);
                slot.velocity_pending = false;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::articulation::ActuatorCfg;
    use crate::asset::AssetDescriptor;
    use crate::spawn::{
        ArticulationRootProps, CollisionProps, Geometry, GroundPlaneCfg, MassProps, RigidBodyProps,
    };

    fn path(p: &str) -> PrimPath {
        PrimPath::parse(p).unwrap()
    }

    fn world() -> RapierWorld {
        let mut assets = AssetLibrary::new("/assets");
        assets
            .register(
                "Robots/Wheeled/wheeled.usd",
                AssetDescriptor::robot(
                    Geometry::Cuboid {
                        size: Vector3::new(0.2, 0.15, 0.1),
                    },
                    1.0,
                    &[("left_wheel_joint", 0.0), ("right_wheel_joint", 0.0)],
                ),
            )
            .unwrap();
        RapierWorld::new(SimulationConfig::default(), assets).unwrap()
    }

    fn rigid_sphere() -> SpawnCfg {
        ShapeCfg::sphere(0.1)
            .with_rigid_body(RigidBodyProps::default())
            .with_mass(MassProps::mass(1.0))
            .with_collision(CollisionProps::default())
            .into()
    }

    #[test]
    fn world_root_exists_up_front() {
        let w = world();
        assert!(w.prim_exists(&path("/World")));
        assert!(w.prim_exists(&PrimPath::root()));
        assert_eq!(w.world_translation(&path("/World")), Some(Vector3::zeros()));
    }

    #[test]
    fn missing_parent_and_duplicates_are_rejected() {
        let mut w = world();
        let err = w
            .create_prim(&path("/World/Nope/Cone"), &rigid_sphere(), &Placement::default())
            .unwrap_err();
        assert_eq!(err, SceneSetupError::MissingParent("/World/Nope/Cone".into()));

        w.create_prim(&path("/World/Origin"), &SpawnCfg::Xform, &Placement::default())
            .unwrap();
        let err = w
            .create_prim(&path("/World/Origin"), &SpawnCfg::Xform, &Placement::default())
            .unwrap_err();
        assert_eq!(err, SceneSetupError::DuplicatePath("/World/Origin".into()));
    }

    #[test]
    fn children_inherit_parent_translation() {
        let mut w = world();
        w.create_prim(&path("/World/Origin1"), &SpawnCfg::Xform, &Placement::at(-1.0, 0.0, 0.0))
            .unwrap();
        let handle = w
            .create_prim(&path("/World/Origin1/Sphere"), &rigid_sphere(), &Placement::at(0.0, 0.0, 1.0))
            .unwrap()
            .unwrap();

        let pose = w.read_pose(handle).unwrap();
        assert_eq!([pose[0], pose[1], pose[2]], [-1.0f32, 0.0, 1.0]);
        assert_eq!(
            w.world_translation(&path("/World/Origin1")),
            Some(Vector3::new(-1.0, 0.0, 0.0))
        );
    }

    #[test]
    fn static_prims_have_no_handle() {
        let mut w = world();
        let ground = w
            .create_prim(
                &path("/World/defaultGroundPlane"),
                &GroundPlaneCfg::default().into(),
                &Placement::default(),
            )
            .unwrap();
        let visual = w
            .create_prim(&path("/World/Visual"), &ShapeCfg::cone(0.1, 0.2).into(), &Placement::default())
            .unwrap();
        assert!(ground.is_none());
        assert!(visual.is_none());
        assert_eq!(w.object_count(), 0);
        assert_eq!(w.prim(&path("/World/defaultGroundPlane")).unwrap().kind, "ground_plane");
    }

    #[test]
    fn step_requires_reset() {
        let mut w = world();
        assert_eq!(w.step(), Err(StepError::NotPlaying));
        w.reset().unwrap();
        assert!(w.step().is_ok());
        assert_eq!(w.steps(), 1);
    }

    #[test]
    fn step_budget_ends_the_run() {
        let mut w = world().with_step_budget(Some(3));
        w.reset().unwrap();
        while w.is_running() {
            w.step().unwrap();
        }
        assert_eq!(w.steps(), 3);

        let mut w = world();
        w.stop();
        assert!(!w.is_running());
    }

    #[test]
    fn camera_eye_must_differ_from_target() {
        let mut w = world();
        let eye = Vector3::new(2.5, 2.5, 2.5);
        assert!(matches!(
            w.set_camera_view(eye, eye),
            Err(SimError::InvalidCamera(_))
        ));
        w.set_camera_view(eye, Vector3::zeros()).unwrap();
        assert_eq!(w.camera().unwrap().eye, eye);
    }

    #[test]
    fn pose_round_trips_without_a_step() {
        let mut w = world();
        let handle = w
            .create_prim(&path("/World/Sphere"), &rigid_sphere(), &Placement::default())
            .unwrap()
            .unwrap();
        let q = UnitQuaternion::from_euler_angles(0.1, 0.2, 0.3);
        let written = [0.5, -0.25, 1.0, q.w, q.i, q.j, q.k];
        w.write_pose(handle, written).unwrap();

        let read = w.read_pose(handle).unwrap();
        for (a, b) in read.iter().zip(written.iter()) {
            assert!((a - b).abs() < 1.0e-6);
        }
    }

    #[test]
    fn writes_reach_the_body_on_flush() {
        let mut w = world();
        let handle = w
            .create_prim(&path("/World/Sphere"), &rigid_sphere(), &Placement::default())
            .unwrap()
            .unwrap();
        w.reset().unwrap();
        w.write_pose(handle, [0.0, 0.0, 2.0, 1.0, 0.0, 0.0, 0.0]).unwrap();
        w.write_velocity(handle, [1.0, 0.0, 0.0, 0.0, 0.0, 0.0]).unwrap();
        w.write_data_to_sim().unwrap();
        w.step().unwrap();
        w.update(handle, 0.01).unwrap();

        let pose = w.read_pose(handle).unwrap();
        assert!(pose[0] > 0.0, "moved along +x: {pose:?}");
        assert!(pose[2] < 2.0, "fell under gravity: {pose:?}");
    }

    #[test]
    fn unknown_handles_are_reported() {
        let mut w = world();
        let bogus = ObjectHandle(42);
        assert_eq!(w.read_pose(bogus), Err(StateError::UnknownHandle(bogus)));
        assert_eq!(
            w.write_velocity(bogus, [0.0; VELOCITY_LEN]),
            Err(StateError::UnknownHandle(bogus))
        );
        assert_eq!(w.update(bogus, 0.01), Err(StateError::UnknownHandle(bogus)));
    }

    #[test]
    fn degenerate_pose_is_rejected() {
        let mut w = world();
        let handle = w
            .create_prim(&path("/World/Sphere"), &rigid_sphere(), &Placement::default())
            .unwrap()
            .unwrap();
        assert_eq!(
            w.write_pose(handle, [0.0; POSE_LEN]),
            Err(StateError::DegenerateQuaternion)
        );
    }

    #[test]
    fn sphere_comes_to_rest_on_the_ground() {
        let mut w = world();
        w.create_prim(
            &path("/World/defaultGroundPlane"),
            &GroundPlaneCfg::default().into(),
            &Placement::default(),
        )
        .unwrap();
        let handle = w
            .create_prim(&path("/World/Sphere"), &rigid_sphere(), &Placement::at(0.0, 0.0, 1.0))
            .unwrap()
            .unwrap();
        w.reset().unwrap();
        for _ in 0..300 {
            w.step().unwrap();
        }
        w.update(handle, 0.01).unwrap();

        let pose = w.read_pose(handle).unwrap();
        let vel = w.read_velocity(handle).unwrap();
        assert!((pose[2] - 0.1).abs() < 0.02, "z = {}", pose[2]);
        assert!(vel[2].abs() < 0.05);
    }

    #[test]
    fn unknown_asset_fails_setup() {
        let mut w = world();
        let cfg = SpawnCfg::AssetFile(AssetFileCfg::new("Props/Missing/missing.usd"));
        let err = w
            .create_prim(&path("/World/Table"), &cfg, &Placement::default())
            .unwrap_err();
        assert!(matches!(err, SceneSetupError::AssetNotFound(_)));
        assert!(!w.prim_exists(&path("/World/Table")));
    }

    #[test]
    fn articulation_keeps_resolved_actuators() {
        let mut w = world();
        let cfg = ArticulationCfg::new("Robots/Wheeled/wheeled.usd")
            .with_actuator("wheel_acts", ActuatorCfg::implicit(&[".*"]));
        let handle = w
            .create_prim(&path("/World/Robot"), &cfg.into(), &Placement::at(0.0, 0.0, 0.1))
            .unwrap()
            .unwrap();

        let resolved = w.articulation(handle).unwrap();
        assert_eq!(resolved.joint_names, vec!["left_wheel_joint", "right_wheel_joint"]);
        assert!(resolved.drives.iter().all(|d| d.is_some()));
        assert_eq!(w.object_path(handle), Some(&path("/World/Robot")));
        assert!(w.bodies[w.slot(handle).unwrap().body].is_dynamic());

        let welded = ArticulationCfg::new("Robots/Wheeled/wheeled.usd")
            .with_articulation_root(ArticulationRootProps {
                fix_root_link: true,
                solver_position_iteration_count: 6,
                ..ArticulationRootProps::default()
            })
            .with_actuator("wheel_acts", ActuatorCfg::implicit(&[".*"]));
        let fixed = w
            .create_prim(&path("/World/Welded"), &welded.into(), &Placement::at(1.0, 0.0, 0.5))
            .unwrap()
            .unwrap();
        let body = &w.bodies[w.slot(fixed).unwrap().body];
        assert!(body.is_kinematic());
        assert_eq!(body.additional_solver_iterations(), 2);

        w.reset().unwrap();
        for _ in 0..50 {
            w.step().unwrap();
        }
        w.update(fixed, w.physics_dt()).unwrap();
        let pose = w.read_pose(fixed).unwrap();
        let drift = (Vector3::new(pose[0], pose[1], pose[2]) - Vector3::new(1.0, 0.0, 0.5)).norm();
        assert!(drift < 1.0e-6, "welded root moved to {pose:?}");
    }

    #[test]
    fn patterns_expand_against_existing_prims() {
        let mut w = world();
        for i in 0..3 {
            w.create_prim(
                &path(&format!("/World/Origin{i}")),
                &SpawnCfg::Xform,
                &Placement::at(i as f32, 0.0, 0.0),
            )
            .unwrap();
        }
        let pattern = PrimPattern::parse("/World/Origin.*/Cone").unwrap();
        let found = w.find_prims(&pattern);
        assert_eq!(found.len(), 3);
        assert_eq!(found[0], path("/World/Origin0/Cone"));
    }
}
