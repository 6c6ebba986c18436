use uuid::Uuid;

use crate::ids::IdSource;
use crate::model::{CareInstructions, Difficulty, Plant};

struct Seed {
    name: &'static str,
    scientific_name: &'static str,
    image_ref: &'static str,
    description: &'static str,
    // water, sunlight, temperature, humidity, soil, fertilization, pruning
    care: [&'static str; 7],
    difficulty: Difficulty,
}

const SEEDS: [Seed; 10] = [
    Seed {
        name: "Monstera Deliciosa",
        scientific_name: "Monstera deliciosa",
        image_ref: "monstera",
        description: "Conocida por sus hojas grandes y perforadas, la Monstera es una planta originaria de las selvas tropicales de América Central.",
        care: [
            "Cada 1-2 semanas, permitiendo que la tierra se seque entre riegos",
            "Luz indirecta brillante",
            "18-30°C",
            "Media a alta",
            "Mezcla bien drenada, rica en materia orgánica",
            "Mensual durante primavera y verano",
            "Ocasional para eliminar hojas amarillas o dañadas",
        ],
        difficulty: Difficulty::Medium,
    },
    Seed {
        name: "Pothos",
        scientific_name: "Epipremnum aureum",
        image_ref: "pothos",
        description: "Planta trepadora de hojas brillantes, perfecta para principiantes debido a su resistencia y fácil mantenimiento.",
        care: [
            "Cada 7-10 días, cuando la tierra esté seca al tacto",
            "Luz indirecta a sombra parcial",
            "15-24°C",
            "Tolera humedad baja",
            "Cualquier tierra universal para macetas",
            "Cada 2-3 meses con fertilizante diluido",
            "Ocasional para controlar crecimiento",
        ],
        difficulty: Difficulty::Easy,
    },
    Seed {
        name: "Calathea Medallion",
        scientific_name: "Calathea medallion",
        image_ref: "calathea",
        description: "Famosa por sus hermosas hojas decorativas con patrones ornamentales en la parte superior y púrpura en la parte inferior.",
        care: [
            "Mantener tierra húmeda pero no empapada",
            "Luz indirecta o filtrada",
            "18-24°C",
            "Alta, beneficia de humidificador",
            "Mezcla rica en nutrientes con buen drenaje",
            "Mensual en temporada de crecimiento",
            "Recortar hojas dañadas cuando sea necesario",
        ],
        difficulty: Difficulty::Hard,
    },
    Seed {
        name: "Suculenta Echeveria",
        scientific_name: "Echeveria elegans",
        image_ref: "echeveria",
        description: "Planta de roseta compacta con hojas carnosas en tonos azul-verdosos, originaria de zonas áridas de México.",
        care: [
            "Cada 2-3 semanas, menos en invierno",
            "Luz directa a indirecta brillante",
            "18-27°C",
            "Baja",
            "Mezcla especial para cactus y suculentas",
            "Esporádica, cada 3 meses en primavera y verano",
            "Raramente necesario",
        ],
        difficulty: Difficulty::Easy,
    },
    Seed {
        name: "Helecho Boston",
        scientific_name: "Nephrolepis exaltata",
        image_ref: "fern",
        description: "Helecho de interior popular con frondas arqueadas y plumosas que puede crecer hasta formar una planta grande y exuberante.",
        care: [
            "Frecuente, mantener tierra constantemente húmeda",
            "Luz indirecta o filtrada",
            "16-24°C",
            "Alta",
            "Rica en materia orgánica con buen drenaje",
            "Mensual durante primavera y verano",
            "Recortar frondas secas o dañadas",
        ],
        difficulty: Difficulty::Medium,
    },
    Seed {
        name: "Orquídea Phalaenopsis",
        scientific_name: "Phalaenopsis sp.",
        image_ref: "orchid",
        description: "Conocida como orquídea mariposa, produce flores duraderas en tallos arqueados y es una de las orquídeas más fáciles de cultivar en casa.",
        care: [
            "Una vez por semana, dejando secar entre riegos",
            "Luz indirecta brillante, sin sol directo",
            "18-29°C durante el día, caída de 5-10°C por la noche",
            "50-70%",
            "Mezcla especial para orquídeas o corteza",
            "Quincenal con fertilizante diluido",
            "Cortar tallos florales después de que las flores se marchiten",
        ],
        difficulty: Difficulty::Medium,
    },
    Seed {
        name: "Sansevieria",
        scientific_name: "Dracaena trifasciata",
        image_ref: "sansevieria",
        description: "También conocida como lengua de suegra o espada de San Jorge, es extremadamente resistente con hojas erectas y puntiagudas.",
        care: [
            "Cada 2-6 semanas, permitiendo que se seque completamente",
            "Adaptable, desde luz baja hasta directa",
            "15-30°C",
            "Tolera cualquier nivel",
            "Bien drenada, mezcla para cactus funciona bien",
            "Esporádica, 2-3 veces al año",
            "Raramente necesario",
        ],
        difficulty: Difficulty::Easy,
    },
    Seed {
        name: "Ficus Lyrata",
        scientific_name: "Ficus lyrata",
        image_ref: "fiddle_leaf",
        description: "Conocido como ficus lira por sus grandes hojas en forma de violín, es una planta de interior popular pero algo exigente.",
        care: [
            "Cada 7-10 días, permitiendo que la superficie se seque",
            "Luz indirecta brillante",
            "18-24°C",
            "Media a alta",
            "Rica en nutrientes con buen drenaje",
            "Mensual en temporada de crecimiento",
            "Ocasional para mantener forma deseada",
        ],
        difficulty: Difficulty::Hard,
    },
    Seed {
        name: "Cactus Estrella",
        scientific_name: "Astrophytum ornatum",
        image_ref: "cactus",
        description: "Cactus de crecimiento lento con forma globular que desarrolla costillas prominentes y espinas llamativas.",
        care: [
            "Cada 2-4 semanas en verano, casi nada en invierno",
            "Luz directa a indirecta brillante",
            "10-32°C",
            "Baja",
            "Muy bien drenada, específica para cactus",
            "2-3 veces al año en temporada de crecimiento",
            "No necesario",
        ],
        difficulty: Difficulty::Easy,
    },
    Seed {
        name: "Planta ZZ",
        scientific_name: "Zamioculcas zamiifolia",
        image_ref: "zz_plant",
        description: "Planta extremadamente resistente con hojas brillantes y tallos gruesos que almacenan agua, ideal para principiantes.",
        care: [
            "Cada 2-3 semanas, menos en invierno",
            "Tolera luz baja a indirecta brillante",
            "16-26°C",
            "Tolera niveles bajos",
            "Bien drenada",
            "Cada 3 meses en temporada de crecimiento",
            "Raramente necesario",
        ],
        difficulty: Difficulty::Easy,
    },
];

/// Builds the fixed plant catalog, drawing one fresh id per plant.
pub fn load_catalog(ids: &mut dyn IdSource) -> Vec<Plant> {
    SEEDS.iter().map(|seed| {
        let [water, sunlight, temperature, humidity, soil, fertilization, pruning] = seed.care;
        Plant {
            id: ids.next_id(),
            name: seed.name.to_owned(),
            scientific_name: seed.scientific_name.to_owned(),
            image_ref: seed.image_ref.to_owned(),
            description: seed.description.to_owned(),
            care_instructions: CareInstructions {
                water_frequency: water.to_owned(),
                sunlight: sunlight.to_owned(),
                temperature: temperature.to_owned(),
                humidity: humidity.to_owned(),
                soil: soil.to_owned(),
                fertilization: fertilization.to_owned(),
                pruning: pruning.to_owned(),
            },
            difficulty: seed.difficulty,
        }
    }).collect()
}

#[derive(Debug, Default, Clone)]
pub struct CatalogFilter {
    pub query: String,
    pub difficulty: Option<Difficulty>,
}

impl CatalogFilter {
    pub fn accepts(&self, plant: &Plant) -> bool {
        plant.matches(&self.query)
            && self.difficulty.map_or(true, |d| plant.difficulty == d)
    }
}

/// Read-only view over a loaded catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    plants: Vec<Plant>,
}

impl Catalog {
    pub fn load(ids: &mut dyn IdSource) -> Self {
        Catalog { plants: load_catalog(ids) }
    }

    pub fn plants(&self) -> &[Plant] {
        &self.plants
    }

    pub fn get(&self, id: Uuid) -> Option<&Plant> {
        self.plants.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.get(id).is_some()
    }

    pub fn search(&self, filter: &CatalogFilter) -> Vec<&Plant> {
        self.plants.iter().filter(|p| filter.accepts(p)).collect()
    }
}
