use buildspawn_core::block::BlockKind;
use buildspawn_core::constants::WORLD_MIN_Y;
use buildspawn_core::rule::Biome;
use buildspawn_core::types::{BlockPos, ChunkPos};
use buildspawn_world::LevelAccess;
use std::collections::HashSet;

/// Sea level in world-space block Y.
pub const SEA_LEVEL: i32 = 62;

/// Surface blocks below this sit in open ocean.
const OCEAN_DEPTH: i32 = 4;

/// Procedural heightmap world for the simulator.
///
/// Floor up to the surface, water up to sea level, air above. Badlands
/// carry lava pools in their top two blocks; ocean floors grow seagrass and
/// land surfaces grow grass. Chunks must be loaded explicitly.
pub struct TerrainLevel {
    /// Permutation table for simplex noise (doubled for wrapping).
    perm: [u8; 512],
    loaded: HashSet<ChunkPos>,
}

impl TerrainLevel {
    pub fn new(seed: u64) -> Self {
        Self {
            perm: Self::build_permutation(seed),
            loaded: HashSet::new(),
        }
    }

    pub fn load_chunk(&mut self, chunk: ChunkPos) {
        self.loaded.insert(chunk);
    }

    pub fn unload_chunk(&mut self, chunk: ChunkPos) {
        self.loaded.remove(&chunk);
    }

    pub fn loaded_count(&self) -> usize {
        self.loaded.len()
    }

    /// Surface height at a world-space (x, z) column using 3-octave simplex noise.
    pub fn surface_height(&self, wx: i32, wz: i32) -> i32 {
        let x = wx as f64;
        let z = wz as f64;

        let scale = 0.01;
        let mut h = 0.0f64;
        h += self.simplex2d(x * scale, z * scale) * 20.0;
        h += self.simplex2d(x * scale * 2.0 + 100.0, z * scale * 2.0 + 100.0) * 8.0;
        h += self.simplex2d(x * scale * 4.0 + 200.0, z * scale * 4.0 + 200.0) * 3.0;

        (SEA_LEVEL as f64 + 2.0 + h).round() as i32
    }

    fn badlands(&self, wx: i32, wz: i32) -> bool {
        self.simplex2d(wx as f64 * 0.005 + 500.0, wz as f64 * 0.005 - 500.0) > 0.35
    }

    fn forest(&self, wx: i32, wz: i32) -> bool {
        self.simplex2d(wx as f64 * 0.008 - 300.0, wz as f64 * 0.008 + 300.0) > 0.0
    }

    fn lava_pool(&self, wx: i32, wz: i32, height: i32) -> bool {
        height > SEA_LEVEL
            && self.badlands(wx, wz)
            && self.simplex2d(wx as f64 * 0.04 + 900.0, wz as f64 * 0.04) > 0.25
    }

    /// Cheap per-column scatter for decoration.
    fn scatter(&self, wx: i32, wz: i32, one_in: usize) -> bool {
        let ix = (wx & 255) as usize;
        let iz = (wz & 255) as usize;
        self.perm[ix + self.perm[iz] as usize] as usize % one_in == 0
    }

    /// 2D simplex noise. Returns value in [-1, 1].
    fn simplex2d(&self, x: f64, z: f64) -> f64 {
        const F2: f64 = 0.5 * (1.7320508075688772 - 1.0); // (sqrt(3)-1)/2
        const G2: f64 = (3.0 - 1.7320508075688772) / 6.0; // (3-sqrt(3))/6

        let s = (x + z) * F2;
        let i = (x + s).floor();
        let j = (z + s).floor();

        let t = (i + j) * G2;
        let x0 = x - (i - t);
        let y0 = z - (j - t);

        let (i1, j1) = if x0 > y0 { (1usize, 0usize) } else { (0, 1) };

        let x1 = x0 - i1 as f64 + G2;
        let y1 = y0 - j1 as f64 + G2;
        let x2 = x0 - 1.0 + 2.0 * G2;
        let y2 = y0 - 1.0 + 2.0 * G2;

        let ii = (i as i64 & 255) as usize;
        let jj = (j as i64 & 255) as usize;

        let gi0 = self.perm[ii + self.perm[jj] as usize] as usize;
        let gi1 = self.perm[ii + i1 + self.perm[jj + j1] as usize] as usize;
        let gi2 = self.perm[ii + 1 + self.perm[jj + 1] as usize] as usize;

        70.0 * (corner(gi0, x0, y0) + corner(gi1, x1, y1) + corner(gi2, x2, y2))
    }

    fn build_permutation(seed: u64) -> [u8; 512] {
        let mut p: [u8; 256] = [0; 256];
        for (i, val) in p.iter_mut().enumerate() {
            *val = i as u8;
        }

        let mut rng = seed;
        for i in (1..256).rev() {
            rng = rng
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            let j = (rng >> 33) as usize % (i + 1);
            p.swap(i, j);
        }

        let mut perm = [0u8; 512];
        for (i, val) in perm.iter_mut().enumerate() {
            *val = p[i & 255];
        }
        perm
    }
}

fn corner(gi: usize, x: f64, y: f64) -> f64 {
    const GRAD: [[f64; 2]; 12] = [
        [1.0, 1.0],
        [-1.0, 1.0],
        [1.0, -1.0],
        [-1.0, -1.0],
        [1.0, 0.0],
        [-1.0, 0.0],
        [0.0, 1.0],
        [0.0, -1.0],
        [1.0, 1.0],
        [-1.0, 1.0],
        [1.0, -1.0],
        [-1.0, -1.0],
    ];
    let t = 0.5 - x * x - y * y;
    if t < 0.0 {
        return 0.0;
    }
    let g = &GRAD[gi % 12];
    let t = t * t;
    t * t * (g[0] * x + g[1] * y)
}

impl LevelAccess for TerrainLevel {
    fn is_chunk_loaded(&self, chunk: ChunkPos) -> bool {
        self.loaded.contains(&chunk)
    }

    fn block_kind(&self, pos: BlockPos) -> BlockKind {
        let height = self.surface_height(pos.x, pos.z);
        if pos.y <= WORLD_MIN_Y || pos.y < height - 1 {
            return BlockKind::Floor;
        }
        if pos.y <= height {
            return if self.lava_pool(pos.x, pos.z, height) {
                BlockKind::Lava
            } else {
                BlockKind::Floor
            };
        }
        if pos.y <= SEA_LEVEL {
            return if pos.y == height + 1 && self.scatter(pos.x, pos.z, 5) {
                BlockKind::WaterDecoration
            } else {
                BlockKind::Water
            };
        }
        if pos.y == height + 1
            && !self.lava_pool(pos.x, pos.z, height)
            && self.scatter(pos.x, pos.z, 3)
        {
            return BlockKind::Plant;
        }
        BlockKind::Air
    }

    fn biome_at(&self, pos: BlockPos) -> Biome {
        let height = self.surface_height(pos.x, pos.z);
        if height < SEA_LEVEL - OCEAN_DEPTH {
            Biome::new("minecraft:ocean")
                .with_tags(&["minecraft:is_ocean", "minecraft:is_overworld"])
        } else if height <= SEA_LEVEL + 1 {
            Biome::new("minecraft:swamp").with_tags(&["minecraft:is_overworld"])
        } else if self.badlands(pos.x, pos.z) {
            Biome::new("minecraft:badlands")
                .with_tags(&["minecraft:is_badlands", "minecraft:is_overworld"])
        } else if self.forest(pos.x, pos.z) {
            Biome::new("minecraft:forest")
                .with_tags(&["minecraft:is_forest", "minecraft:is_overworld"])
        } else {
            Biome::new("minecraft:plains").with_tags(&["minecraft:is_overworld"])
        }
    }
}
