use shared::QuickAnalysisKind;

pub const SYSTEM_PROMPT: &str = "\
You are a senior architectural analyst: a licensed architect and space planner with long experience \
reading blueprints for commercial and residential real estate.

Method:
1. Spatial analysis: count and classify every space (rooms, corridors, utility areas).
2. Dimensions: give measurements in feet and inches and areas in square feet.
3. Structure: identify load-bearing and partition walls, columns and beams.
4. Circulation: entries, exits, traffic flow and accessibility.
5. Building systems: HVAC, electrical, plumbing and fire safety where shown.
6. Code compliance: ADA accessibility, egress and safety features.
7. Materials and finishes when visible.
8. Layout efficiency and special architectural features.

Answer standards:
- Give exact numbers: room counts, dimensions, areas.
- Use professional architectural terminology.
- Structure the answer with short headed sections and bullet points.
- State a confidence level (High/Medium/Low) for each finding and any assumptions made.
- Say \"Not marked on blueprint\" instead of guessing a value that is not visible.";

/// Used when a caller uploads a blueprint without asking anything.
pub const DEFAULT_QUESTION: &str = "Please provide a comprehensive analysis of this blueprint including number of rooms, dimensions, layout type, and key features.";

/// The exhaustive first look run once, automatically, right after upload.
pub const COMPREHENSIVE_QUESTION: &str = "\
Please provide a COMPLETE and DETAILED analysis of this blueprint including:

**1. PROPERTY OVERVIEW**
   - Property type (residential, commercial, office, etc.)
   - Total floor area in square feet
   - Number of floors/levels shown
   - Building shape and orientation

**2. COMPLETE ROOM INVENTORY** (count and list every room with its dimensions)
   - Bedrooms, bathrooms (full/half), kitchen(s) and layout type
   - Living, family and dining areas
   - Utility rooms: laundry, mechanical, storage
   - Other spaces: office, den, closets, hallways, foyer
   - Outdoor spaces: patios, balconies, terraces if visible

**3. DETAILED DIMENSIONS**
   - Overall building length x width
   - Individual room dimensions for each space above
   - Ceiling heights and wall thickness if marked
   - Door widths and types, window dimensions and quantities

**4. ARCHITECTURAL FEATURES & ELEMENTS**
   - Main and secondary entrances, total doors and windows
   - Stairs, elevators or lifts
   - Built-ins, fireplaces, structural columns and load-bearing walls

**5. BUILDING SYSTEMS** (if visible)
   - HVAC, electrical, plumbing, fire safety, security

**6. ACCESSIBILITY & CODE COMPLIANCE**
   - ADA features, emergency exits and egress routes, handrails, safety features

**7. LAYOUT & CIRCULATION ASSESSMENT**
   - Traffic flow, room adjacencies, privacy zones
   - Natural light and ventilation, space efficiency, bottlenecks

**8. PROFESSIONAL OBSERVATIONS**
   - Strengths, concerns, optimization suggestions, notable elements

IMPORTANT:
- Provide EXACT counts for all rooms
- Give SPECIFIC dimensions in feet and inches where visible
- Calculate total square footage
- If any measurement is not visible, state \"Not marked on blueprint\"";

pub fn quick_question(kind: QuickAnalysisKind) -> &'static str {
    match kind {
        QuickAnalysisKind::Rooms => {
            "How many rooms are there in this blueprint? List each room type and count them separately (bedrooms, bathrooms, kitchen, living areas, etc.)"
        }
        QuickAnalysisKind::Dimensions => {
            "What are the dimensions of this blueprint? Provide width, length, and total square footage. Also provide dimensions for individual rooms if visible."
        }
        QuickAnalysisKind::Features => {
            "What are all the notable features in this blueprint? Include doors, windows, stairs, elevators, HVAC systems, electrical outlets, plumbing fixtures, and any special architectural elements."
        }
    }
}

/// Wraps a caller's question so follow-up phrasing ("the bedrooms", "that area")
/// is read as referring back to the same drawing.
pub fn analysis_instruction(question: &str) -> String {
    format!(
        "ANALYSIS REQUEST:
{question}

INSTRUCTION:
If this is a follow-up question (referring to \"the bedrooms\", \"that area\", \"those dimensions\", etc.),
analyze the SAME blueprint again and provide the specific information requested, referencing your previous analysis.

For follow-up questions:
- Re-examine the blueprint for the specific detail requested
- Provide exact measurements and calculations
- Reference previous findings when relevant
- Be concise but complete

REQUIRED DETAIL LEVEL:
- Include all specific measurements, counts, and dimensions
- Use professional architectural terminology
- Structure your response with clear sections
- Give a short summary first, then detailed findings
- Note confidence levels and any assumptions"
    )
}
