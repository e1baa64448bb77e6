quantity!(Cost, via: f64, suffix: "p", precision: 1);
