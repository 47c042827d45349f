pub fn exchange_fixture() -> Vec<(&'static str, &'static str)> {
    return vec![
        (
            "Hola Bob, estoy evaluando un edificio de 40 viviendas.",
            "Buen día. Para evaluar la viabilidad necesito el presupuesto de obra y el precio de venta estimado por metro cuadrado.",
        ),
        (
            "El presupuesto es de 3,2 millones y vendemos a 2.100 por metro cuadrado.",
            "Con esos datos la TIR del proyecto se sitúa cerca del 17%. Propongo tres escenarios: conservador, moderado y agresivo.",
        ),
        (
            "¿Qué estructura de capital recomiendas?",
            "Una combinación 60/40 de deuda y equity mantiene el ROE por encima del 15% con riesgo controlado.",
        ),
    ];
}

pub fn persona_fixture() -> &'static str {
    return "Eres Bob, un asistente financiero para proyectos de construcción.";
}
