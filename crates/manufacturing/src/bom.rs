//! Bill of materials: the caller's draft, and the resolved lines that get saved.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use atelier_core::{DomainError, DomainResult, RawMaterialId, ensure_non_negative};
use atelier_inventory::RawMaterial;

use crate::costing::{CostAggregator, CostBreakdown, MaterialUsage};
use crate::labor::{LaborEntry, LaborInput};

/// One material line as entered by the caller.
///
/// Which fields matter depends on the pricing category of the referenced
/// material; the others are ignored. `pieces` defaults to 1 when unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumptionInput {
    pub material_id: RawMaterialId,
    /// Weight for weight-based materials.
    #[serde(default)]
    pub quantity: Option<Decimal>,
    #[serde(default)]
    pub pieces: Option<u32>,
    #[serde(default)]
    pub carat_per_piece: Option<Decimal>,
    /// Unit price (per gram / per carat). Captured from the catalog when unset.
    #[serde(default)]
    pub cost_at_time: Option<Decimal>,
    /// Per-piece price for flat-priced materials. Captured from the catalog when unset.
    #[serde(default)]
    pub cost_per_piece: Option<Decimal>,
}

impl ConsumptionInput {
    fn empty(material_id: RawMaterialId) -> Self {
        Self {
            material_id,
            quantity: None,
            pieces: None,
            carat_per_piece: None,
            cost_at_time: None,
            cost_per_piece: None,
        }
    }

    pub fn weight(material_id: RawMaterialId, quantity: Decimal) -> Self {
        Self {
            quantity: Some(quantity),
            ..Self::empty(material_id)
        }
    }

    pub fn carats(material_id: RawMaterialId, pieces: Option<u32>, carat_per_piece: Decimal) -> Self {
        Self {
            pieces,
            carat_per_piece: Some(carat_per_piece),
            ..Self::empty(material_id)
        }
    }

    pub fn pieces(material_id: RawMaterialId, pieces: Option<u32>) -> Self {
        Self {
            pieces,
            ..Self::empty(material_id)
        }
    }

    pub fn with_cost_at_time(mut self, cost_at_time: Decimal) -> Self {
        self.cost_at_time = Some(cost_at_time);
        self
    }

    pub fn with_cost_per_piece(mut self, cost_per_piece: Decimal) -> Self {
        self.cost_per_piece = Some(cost_per_piece);
        self
    }

    pub fn validate(&self) -> DomainResult<()> {
        let fields = [
            ("quantity", self.quantity),
            ("carat_per_piece", self.carat_per_piece),
            ("cost_at_time", self.cost_at_time),
            ("cost_per_piece", self.cost_per_piece),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                ensure_non_negative(field, value)?;
            }
        }
        Ok(())
    }
}

/// Material and labor lines as submitted with a finished-item draft, in bill order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BomDraft {
    #[serde(default)]
    pub materials: Vec<ConsumptionInput>,
    #[serde(default)]
    pub labor: Vec<LaborInput>,
}

impl BomDraft {
    pub fn validate(&self) -> DomainResult<()> {
        for input in &self.materials {
            input.validate()?;
        }
        for input in &self.labor {
            input.kind.validate()?;
        }
        Ok(())
    }
}

/// Persisted material line belonging to one finished item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaterialConsumptionLine {
    line_no: u32,
    material_id: RawMaterialId,
    material_name: String,
    usage: MaterialUsage,
    subtotal: Decimal,
}

impl MaterialConsumptionLine {
    /// Resolve a caller line against its material, capturing prices as of now.
    pub fn capture(line_no: u32, material: &RawMaterial, input: &ConsumptionInput) -> DomainResult<Self> {
        let usage = MaterialUsage::capture(material.pricing_category(), input, material.cost_per_unit());
        Self::new(line_no, material.id_typed(), material.name(), usage)
    }

    pub fn new(
        line_no: u32,
        material_id: RawMaterialId,
        material_name: impl Into<String>,
        usage: MaterialUsage,
    ) -> DomainResult<Self> {
        let subtotal = usage.subtotal()?;
        Ok(Self {
            line_no,
            material_id,
            material_name: material_name.into(),
            usage,
            subtotal,
        })
    }

    pub fn line_no(&self) -> u32 {
        self.line_no
    }

    pub fn material_id(&self) -> RawMaterialId {
        self.material_id
    }

    pub fn material_name(&self) -> &str {
        &self.material_name
    }

    pub fn usage(&self) -> &MaterialUsage {
        &self.usage
    }

    pub fn subtotal(&self) -> Decimal {
        self.subtotal
    }

    pub fn quantity_used(&self) -> DomainResult<Decimal> {
        self.usage.quantity_used()
    }

    pub fn cost_at_time(&self) -> Decimal {
        self.usage.cost_at_time()
    }

    pub fn deduction_quantity(&self) -> Decimal {
        self.usage.deduction_quantity()
    }
}

/// A draft line whose material id did not resolve to a catalog entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedLine {
    pub line_no: u32,
    pub material_id: RawMaterialId,
}

/// The resolved material and labor lines of one finished item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BillOfMaterials {
    pub materials: Vec<MaterialConsumptionLine>,
    pub labor: Vec<LaborEntry>,
}

/// Outcome of resolving a draft: the bill plus any lines that were dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBill {
    pub bill: BillOfMaterials,
    pub unresolved: Vec<UnresolvedLine>,
}

impl BillOfMaterials {
    /// Resolve every draft line through `lookup`, in bill order.
    ///
    /// Line numbers are 1-based draft positions, so a dropped line leaves a gap.
    /// Lines whose material is missing contribute neither cost nor stock effect.
    /// A line whose cost overflows aborts resolution with the domain error.
    pub fn resolve<E>(
        draft: &BomDraft,
        mut lookup: impl FnMut(RawMaterialId) -> Result<Option<RawMaterial>, E>,
    ) -> Result<ResolvedBill, E>
    where
        E: From<DomainError>,
    {
        let mut materials = Vec::with_capacity(draft.materials.len());
        let mut unresolved = Vec::new();

        for (idx, input) in draft.materials.iter().enumerate() {
            let line_no = idx as u32 + 1;
            match lookup(input.material_id)? {
                Some(material) => materials.push(MaterialConsumptionLine::capture(line_no, &material, input)?),
                None => unresolved.push(UnresolvedLine {
                    line_no,
                    material_id: input.material_id,
                }),
            }
        }

        let labor = draft
            .labor
            .iter()
            .enumerate()
            .map(|(idx, input)| LaborEntry::new(idx as u32 + 1, input))
            .collect::<DomainResult<Vec<_>>>()?;

        Ok(ResolvedBill {
            bill: BillOfMaterials { materials, labor },
            unresolved,
        })
    }

    pub fn cost_breakdown(&self) -> DomainResult<CostBreakdown> {
        CostAggregator::breakdown(&self.materials, &self.labor)
    }

    pub fn total_cost(&self) -> DomainResult<Decimal> {
        Ok(self.cost_breakdown()?.total)
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty() && self.labor.is_empty()
    }
}
