use chrono::{Duration, NaiveDate};
use serde_json::{json, Value};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len())]
    }
}

// (product, category, base price)
const PRODUCTS: [(&str, &str, f64); 10] = [
    ("Smart TV", "eletronicos", 2300.0),
    ("Celular Plus X42", "eletronicos", 1800.0),
    ("Fone de ouvido", "eletronicos", 150.0),
    ("Cadeira de escritório", "moveis", 420.0),
    ("Mesa de jantar", "moveis", 560.0),
    ("Modelagem preditiva", "livros", 90.0),
    ("Iniciando em programação", "livros", 60.0),
    ("Panela de pressão", "utilidades domesticas", 85.0),
    ("Bola de futebol", "esporte e lazer", 40.0),
    ("Cubo mágico 8x8", "brinquedos", 30.0),
];

const SELLERS: [&str; 5] = [
    "Ana Duarte",
    "Beatriz Moraes",
    "Juliana Costa",
    "Maria Oliveira",
    "Thiago Silva",
];

// (state, lat, lon)
const LOCATIONS: [(&str, f64, f64); 8] = [
    ("SP", -22.19, -48.79),
    ("RJ", -22.25, -42.66),
    ("MG", -18.10, -44.38),
    ("BA", -13.29, -41.71),
    ("RS", -30.17, -53.50),
    ("PR", -24.89, -51.55),
    ("PE", -8.38, -37.86),
    ("DF", -15.83, -47.86),
];

const PAYMENTS: [&str; 4] = ["cartao_credito", "boleto", "cupom", "cartao_debito"];

fn main() {
    let mut rng = SimpleRng::new(42);
    let first_day = NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid start date");
    let days_in_range = 4 * 365;

    let sales: Vec<Value> = (0..2000)
        .map(|_| {
            let (product, category, base) = *rng.pick(&PRODUCTS);
            let (location, lat, lon) = *rng.pick(&LOCATIONS);
            let price = (base * (0.8 + 0.4 * rng.next_f64()) * 100.0).round() / 100.0;
            let freight = (price * (0.03 + 0.05 * rng.next_f64()) * 100.0).round() / 100.0;
            let day = first_day + Duration::days(rng.below(days_in_range) as i64);
            let payment = *rng.pick(&PAYMENTS);
            let installments = if payment == "cartao_credito" {
                1 + rng.below(10)
            } else {
                1
            };

            json!({
                "Produto": product,
                "Categoria do Produto": category,
                "Preço": price,
                "Frete": freight,
                "Data da Compra": day.format("%d/%m/%Y").to_string(),
                "Vendedor": *rng.pick(&SELLERS),
                "Local da compra": location,
                "Avaliação da compra": 1 + rng.below(5),
                "Tipo de pagamento": payment,
                "Quantidade de parcelas": installments,
                "lat": lat,
                "lon": lon,
            })
        })
        .collect();

    let output_path = "sample_sales.json";
    let text = serde_json::to_string_pretty(&sales).expect("Failed to serialize sales");
    std::fs::write(output_path, text).expect("Failed to write output file");

    println!("Wrote {} sales to {output_path}", sales.len());
}
